use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Test case
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub section_id: i32,
    pub title: String,
    pub template_id: i32,
    pub type_id: i32,
    pub priority_id: i32,
    /// JSON array of `{"step", "expected"}` objects
    pub steps: Option<Json>,
    pub expected_result: Option<String>,
    pub preconditions: Option<String>,
    pub estimate: Option<String>,
    pub refs: Option<String>,
    pub created_on: i64,
    /// Changes only on explicit case updates
    pub updated_on: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
