use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, DbErr, EntityTrait, ModelTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};
use serde_json::Value;

use super::entities::{
    attachments, issues, Attachment, AttachmentActiveModel, Attachments, Issue, IssueActiveModel, Issues,
};
use crate::connection::DatabaseConnection;
use crate::error::{StorageError, StorageResult};
use crate::gate::ResetGate;

/// Fields for a new issue; lookups are already resolved to canonical names
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub project_key: String,
    pub summary: String,
    pub description: Option<Value>,
    pub issue_type: String,
    pub priority: String,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub labels: Vec<String>,
    pub components: Vec<String>,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct IssueChanges {
    pub summary: Option<String>,
    pub description: Option<Option<Value>>,
    pub issue_type: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<Option<String>>,
    pub reporter: Option<Option<String>>,
    pub labels: Option<Vec<String>>,
    pub components: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub author: String,
}

/// Repository for Jira issues, keys and attachments
#[derive(Clone)]
pub struct JiraRepository {
    db: DatabaseConnection,
    gate: ResetGate,
}

impl JiraRepository {
    pub fn new(db: DatabaseConnection, gate: ResetGate) -> Self {
        Self { db, gate }
    }

    /// Create an issue under the next key of its project
    pub async fn create(&self, new: NewIssue) -> StorageResult<Issue> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        let number = next_key_number(&txn, &new.project_key).await?;
        let now = Utc::now();

        let issue = IssueActiveModel {
            key: Set(format!("{}-{}", new.project_key, number)),
            project_key: Set(new.project_key),
            number: Set(number),
            summary: Set(new.summary),
            description: Set(new.description),
            issue_type: Set(new.issue_type),
            priority: Set(new.priority),
            status: Set(super::lookups::INITIAL_STATUS.to_string()),
            assignee: Set(new.assignee),
            reporter: Set(new.reporter),
            labels: Set(serde_json::to_value(new.labels)?),
            components: Set(serde_json::to_value(new.components)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(issue)
    }

    /// Find an issue by key (`QA-1`, case-insensitive) or numeric id
    pub async fn find(&self, key_or_id: &str) -> StorageResult<Option<Issue>> {
        let _guard = self.gate.shared().await;
        find_issue(self.db.get_connection(), key_or_id).await
    }

    pub async fn get(&self, key_or_id: &str) -> StorageResult<Issue> {
        self.find(key_or_id)
            .await?
            .ok_or_else(|| StorageError::not_found("issue", key_or_id))
    }

    /// An issue and its attachments, read under one guard
    pub async fn get_with_attachments(&self, key_or_id: &str) -> StorageResult<(Issue, Vec<Attachment>)> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();

        let issue = require_issue(conn, key_or_id).await?;
        let attachments = attachments_of(conn, vec![issue.id]).await?.remove(&issue.id).unwrap_or_default();
        Ok((issue, attachments))
    }

    /// Every issue in ascending id order with attachments grouped by issue id
    pub async fn list_with_attachments(&self) -> StorageResult<(Vec<Issue>, HashMap<i32, Vec<Attachment>>)> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();

        let issues = Issues::find().order_by(issues::Column::Id, Order::Asc).all(conn).await?;
        let attachments = attachments_of(conn, issues.iter().map(|i| i.id).collect()).await?;
        Ok((issues, attachments))
    }

    /// Every issue in ascending id order
    pub async fn list(&self) -> StorageResult<Vec<Issue>> {
        let _guard = self.gate.shared().await;
        let issues = Issues::find()
            .order_by(issues::Column::Id, Order::Asc)
            .all(self.db.get_connection())
            .await?;
        Ok(issues)
    }

    pub async fn count(&self) -> StorageResult<u64> {
        let _guard = self.gate.shared().await;
        Ok(Issues::find().count(self.db.get_connection()).await?)
    }

    /// Merge `changes` into the issue and bump `updated_at`
    pub async fn update(&self, key_or_id: &str, changes: IssueChanges) -> StorageResult<Issue> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;
        let issue = require_issue(&txn, key_or_id).await?;

        let mut active: IssueActiveModel = issue.into();
        if let Some(summary) = changes.summary {
            active.summary = Set(summary);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(issue_type) = changes.issue_type {
            active.issue_type = Set(issue_type);
        }
        if let Some(priority) = changes.priority {
            active.priority = Set(priority);
        }
        if let Some(assignee) = changes.assignee {
            active.assignee = Set(assignee);
        }
        if let Some(reporter) = changes.reporter {
            active.reporter = Set(reporter);
        }
        if let Some(labels) = changes.labels {
            active.labels = Set(serde_json::to_value(labels)?);
        }
        if let Some(components) = changes.components {
            active.components = Set(serde_json::to_value(components)?);
        }
        active.updated_at = Set(Utc::now());

        let issue = active.update(&txn).await?;
        txn.commit().await?;
        Ok(issue)
    }

    /// Move the issue to `status` and bump `updated_at`
    pub async fn set_status(&self, key_or_id: &str, status: &str) -> StorageResult<Issue> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;
        let issue = require_issue(&txn, key_or_id).await?;

        let mut active: IssueActiveModel = issue.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now());

        let issue = active.update(&txn).await?;
        txn.commit().await?;
        Ok(issue)
    }

    /// Hard delete; the key is never handed out again
    pub async fn delete(&self, key_or_id: &str) -> StorageResult<()> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        let issue = require_issue(&txn, key_or_id).await?;

        Attachments::delete_many()
            .filter(attachments::Column::IssueId.eq(issue.id))
            .exec(&txn)
            .await?;
        issue.delete(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Record attachment metadata and bump the issue's `updated_at`
    pub async fn add_attachments(
        &self,
        key_or_id: &str,
        files: Vec<NewAttachment>,
    ) -> StorageResult<Vec<Attachment>> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        let issue = require_issue(&txn, key_or_id).await?;
        let issue_id = issue.id;
        let now = Utc::now();

        let mut created = Vec::with_capacity(files.len());
        for file in files {
            let attachment = AttachmentActiveModel {
                issue_id: Set(issue_id),
                filename: Set(file.filename),
                mime_type: Set(file.mime_type),
                size: Set(file.size),
                author: Set(file.author),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            created.push(attachment);
        }

        let mut active: IssueActiveModel = issue.into();
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(created)
    }

    pub async fn get_attachment(&self, id: i32) -> StorageResult<Attachment> {
        let _guard = self.gate.shared().await;
        Attachments::find_by_id(id)
            .one(self.db.get_connection())
            .await?
            .ok_or_else(|| StorageError::not_found("attachment", id))
    }

    pub async fn delete_attachment(&self, id: i32) -> StorageResult<()> {
        let _guard = self.gate.shared().await;
        let result = Attachments::delete_by_id(id)
            .exec(self.db.get_connection())
            .await?;
        if result.rows_affected == 0 {
            return Err(StorageError::not_found("attachment", id));
        }
        Ok(())
    }
}

async fn find_issue<C: ConnectionTrait>(conn: &C, key_or_id: &str) -> StorageResult<Option<Issue>> {
    let issue = match key_or_id.parse::<i32>() {
        Ok(id) => Issues::find_by_id(id).one(conn).await?,
        Err(_) => {
            Issues::find()
                .filter(issues::Column::Key.eq(key_or_id.to_uppercase()))
                .one(conn)
                .await?
        }
    };
    Ok(issue)
}

async fn require_issue<C: ConnectionTrait>(conn: &C, key_or_id: &str) -> StorageResult<Issue> {
    find_issue(conn, key_or_id)
        .await?
        .ok_or_else(|| StorageError::not_found("issue", key_or_id))
}

/// Attachments of the given issues in id order, grouped by issue id
async fn attachments_of<C: ConnectionTrait>(
    conn: &C,
    issue_ids: Vec<i32>,
) -> StorageResult<HashMap<i32, Vec<Attachment>>> {
    let rows = Attachments::find()
        .filter(attachments::Column::IssueId.is_in(issue_ids))
        .order_by(attachments::Column::Id, Order::Asc)
        .all(conn)
        .await?;

    let mut grouped: HashMap<i32, Vec<Attachment>> = HashMap::new();
    for attachment in rows {
        grouped.entry(attachment.issue_id).or_default().push(attachment);
    }
    Ok(grouped)
}

/// Advance the project's counter atomically and return the new value
async fn next_key_number(txn: &DatabaseTransaction, project_key: &str) -> StorageResult<i32> {
    let row = txn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "INSERT INTO project_counters (project_key, last_number) VALUES (?, 1) \
             ON CONFLICT(project_key) DO UPDATE SET last_number = last_number + 1 \
             RETURNING last_number",
            [project_key.into()],
        ))
        .await?
        .ok_or(DbErr::RecordNotInserted)?;

    Ok(row.try_get("", "last_number")?)
}
