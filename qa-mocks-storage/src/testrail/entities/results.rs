use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Execution result; append-only
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub case_id: i32,
    /// Run entry the result was recorded against, if any
    pub test_id: Option<i32>,
    pub status_id: i32,
    pub comment: Option<String>,
    pub elapsed: Option<String>,
    pub defects: Option<String>,
    pub created_on: i64,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
