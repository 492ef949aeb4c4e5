use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Case section; sections nest through `parent_id` within one project
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    /// 0 for top-level sections
    pub depth: i32,
    pub display_order: i32,
    pub created_on: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
