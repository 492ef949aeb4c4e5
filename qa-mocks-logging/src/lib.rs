//! Logging setup for the QA mock services
//!
//! All crates log through `tracing`; this crate only decides where the events go.

pub mod init;

pub use init::{init_logging, init_simple_tracing};
