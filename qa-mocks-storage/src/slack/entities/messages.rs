use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Message timestamp in microseconds; unique and strictly increasing
    #[sea_orm(unique)]
    pub ts_micros: i64,
    pub channel_id: String,
    pub user: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    /// Parent message's `ts` for thread replies
    pub thread_ts: Option<String>,
    pub file_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::channels::Entity",
        from = "Column::ChannelId",
        to = "super::channels::Column::Id",
        on_delete = "Cascade"
    )]
    Channel,
}

impl Related<super::channels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Channel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Slack-style `"{secs}.{micros}"` rendering of the timestamp
    pub fn ts(&self) -> String {
        crate::slack::ts::format_ts(self.ts_micros)
    }
}
