use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, IntoActiveModel};
use serde::Deserialize;

use super::entities::{channels, messages, Channels, Messages};
use crate::error::{StorageError, StorageResult};
use crate::seed::Fixture;

const SEED_DOCUMENT: &str = include_str!("seed.json");

#[derive(Debug, Deserialize)]
struct SeedDocument {
    channels: Vec<channels::Model>,
    messages: Vec<messages::Model>,
}

/// `#qa-reports` and `#general` with five messages at fixed timestamps
#[derive(Debug, Clone, Copy, Default)]
pub struct SlackFixture;

#[async_trait]
impl Fixture for SlackFixture {
    fn name(&self) -> &'static str {
        "slack"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["messages", "files", "channels"]
    }

    fn sentinel_table(&self) -> &'static str {
        "channels"
    }

    async fn load(&self, txn: &DatabaseTransaction) -> StorageResult<()> {
        let seed: SeedDocument = serde_json::from_str(SEED_DOCUMENT)
            .map_err(|e| StorageError::Seed(format!("invalid slack seed document: {}", e)))?;

        Channels::insert_many(seed.channels.into_iter().map(|c| c.into_active_model().reset_all()))
            .exec(txn)
            .await?;
        Messages::insert_many(seed.messages.into_iter().map(|m| m.into_active_model().reset_all()))
            .exec(txn)
            .await?;

        Ok(())
    }
}
