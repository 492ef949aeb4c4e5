//! Slack channel, message and file store

pub mod entities;
pub mod fixture;
pub mod migration;
pub mod repository;
pub mod ts;

pub use fixture::SlackFixture;
pub use migration::Migrator;
pub use repository::{ChannelMessages, HistoryWindow, NewFile, NewMessage, SlackRepository, ThreadSummary, FILE_UPLOADER};
