//! Jira issue store

pub mod entities;
pub mod fixture;
pub mod lookups;
pub mod migration;
pub mod repository;

pub use fixture::JiraFixture;
pub use migration::Migrator;
pub use repository::{IssueChanges, JiraRepository, NewAttachment, NewIssue};
