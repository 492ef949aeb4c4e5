pub mod health;
pub mod jira;
pub mod slack;
pub mod testrail;

pub use health::health_check;
