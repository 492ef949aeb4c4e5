use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// TestRail project
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub announcement: Option<String>,
    pub show_announcement: bool,
    pub is_completed: bool,
    pub completed_on: Option<i64>,
    /// Unix seconds
    pub created_on: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
