use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A case inside a run (a TestRail "test")
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "run_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub run_id: i32,
    pub case_id: i32,
    /// Case title at the time the run was created
    pub title: String,
    pub status_id: i32,
    pub comment: Option<String>,
    pub elapsed: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
