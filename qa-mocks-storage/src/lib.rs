//! Embedded SQLite storage for the QA mock services
//!
//! Each mocked vendor owns one database with its own migrations, a
//! [`seed::Fixture`] describing its deterministic demo data, and a repository.
//! All repositories share the [`ResetGate`] of their store so a reset is never
//! observed half done.

pub mod connection;
pub mod error;
pub mod gate;
pub mod jira;
pub mod seed;
pub mod slack;
pub mod store;
pub mod testrail;

pub use connection::DatabaseConnection;
pub use error::{StorageError, StorageResult};
pub use gate::ResetGate;
pub use seed::{Fixture, SeedLifecycle};
pub use store::ServiceStore;
