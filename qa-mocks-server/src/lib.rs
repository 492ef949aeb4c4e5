//! Process wiring for the QA mock services
//!
//! [`Server`] opens each selected service's store, builds its router and serves
//! it on the service's port until a shutdown signal arrives.

pub mod startup;

pub use startup::{Server, Service, ServiceSelection};
