use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Jira issue
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "issues")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Composite key such as `QA-12`
    #[sea_orm(unique)]
    pub key: String,

    pub project_key: String,

    /// Numeric part of the key, used for ordering
    pub number: i32,

    pub summary: String,

    /// Plain string or Atlassian Document Format object
    pub description: Option<Json>,

    pub issue_type: String,
    pub priority: String,
    pub status: String,
    pub assignee: Option<String>,
    pub reporter: Option<String>,

    /// JSON array of label strings
    pub labels: Json,

    /// JSON array of component names
    pub components: Json,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attachments::Entity")]
    Attachments,
}

impl Related<super::attachments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn label_list(&self) -> Vec<String> {
        string_list(&self.labels)
    }

    pub fn component_list(&self) -> Vec<String> {
        string_list(&self.components)
    }
}

fn string_list(value: &Json) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
