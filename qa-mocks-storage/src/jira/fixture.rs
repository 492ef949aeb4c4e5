use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseTransaction, Set};
use serde::Deserialize;

use super::entities::{IssueActiveModel, ProjectCounterActiveModel};
use crate::error::{StorageError, StorageResult};
use crate::seed::Fixture;

const SEED_DOCUMENT: &str = include_str!("seed.json");

#[derive(Debug, Deserialize)]
struct SeedDocument {
    counters: Vec<SeedCounter>,
    issues: Vec<SeedIssue>,
}

#[derive(Debug, Deserialize)]
struct SeedCounter {
    project_key: String,
    last_number: i32,
}

#[derive(Debug, Deserialize)]
struct SeedIssue {
    id: i32,
    key: String,
    project_key: String,
    number: i32,
    summary: String,
    description: Option<serde_json::Value>,
    issue_type: String,
    priority: String,
    status: String,
    assignee: Option<String>,
    reporter: Option<String>,
    labels: Vec<String>,
    components: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Seeded issues `QA-1..QA-3` and the `QA` counter at 3
#[derive(Debug, Clone, Copy, Default)]
pub struct JiraFixture;

#[async_trait]
impl Fixture for JiraFixture {
    fn name(&self) -> &'static str {
        "jira"
    }

    fn tables(&self) -> &'static [&'static str] {
        &["attachments", "issues", "project_counters"]
    }

    fn sentinel_table(&self) -> &'static str {
        "project_counters"
    }

    async fn load(&self, txn: &DatabaseTransaction) -> StorageResult<()> {
        let seed: SeedDocument = serde_json::from_str(SEED_DOCUMENT)
            .map_err(|e| StorageError::Seed(format!("invalid jira seed document: {}", e)))?;

        for counter in seed.counters {
            ProjectCounterActiveModel {
                project_key: Set(counter.project_key),
                last_number: Set(counter.last_number),
            }
            .insert(txn)
            .await?;
        }

        for issue in seed.issues {
            IssueActiveModel {
                id: Set(issue.id),
                key: Set(issue.key),
                project_key: Set(issue.project_key),
                number: Set(issue.number),
                summary: Set(issue.summary),
                description: Set(issue.description),
                issue_type: Set(issue.issue_type),
                priority: Set(issue.priority),
                status: Set(issue.status),
                assignee: Set(issue.assignee),
                reporter: Set(issue.reporter),
                labels: Set(serde_json::to_value(issue.labels)?),
                components: Set(serde_json::to_value(issue.components)?),
                created_at: Set(issue.created_at),
                updated_at: Set(issue.updated_at),
            }
            .insert(txn)
            .await?;
        }

        Ok(())
    }
}
