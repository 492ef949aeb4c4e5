pub mod common;
pub mod jira;
pub mod slack;
pub mod testrail;

// Re-export commonly used types
pub use common::{HealthResponse, ResetResponse};
