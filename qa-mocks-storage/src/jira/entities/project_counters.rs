use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Last issued key number per project; never decremented except by reset
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "project_counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub project_key: String,
    pub last_number: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
