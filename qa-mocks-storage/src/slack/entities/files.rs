use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Uploaded file metadata; content is never stored
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub title: String,
    pub mimetype: String,
    pub filetype: String,
    pub size: i64,
    pub user: String,
    /// JSON array of channel ids the file was shared to
    pub channels: Json,
    pub created: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Public `F...` identifier
    pub fn public_id(&self) -> String {
        format!("F{:010}", self.id)
    }

    pub fn channel_list(&self) -> Vec<String> {
        serde_json::from_value(self.channels.clone()).unwrap_or_default()
    }
}
