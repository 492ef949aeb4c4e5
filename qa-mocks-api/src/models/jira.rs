//! Jira request parsing and response shaping
//!
//! Bodies are parsed from raw JSON rather than derived structs because Jira
//! distinguishes an absent field from an explicit `null` on update, and reports
//! every bad field at once instead of stopping at the first.

use chrono::{DateTime, Utc};
use qa_mocks_config::validation::is_project_key;
use qa_mocks_storage::jira::entities::{Attachment, Issue};
use qa_mocks_storage::jira::lookups::{self, Status, Transition};
use qa_mocks_storage::jira::{IssueChanges, NewIssue};
use qa_mocks_web::{FieldError, WebError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::context::JiraContext;

/// `GET /rest/api/3/search` query
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SearchQuery {
    /// Index of the first issue to return
    pub start_at: Option<i64>,
    /// Page size, capped at 100
    pub max_results: Option<i64>,
    pub jql: Option<String>,
}

/// `POST /rest/api/3/search` body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub start_at: Option<i64>,
    pub max_results: Option<i64>,
    pub jql: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransitionRequest {
    pub transition: TransitionRef,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransitionRef {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
    #[serde(rename = "self")]
    pub self_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssueResponse {
    pub id: String,
    pub key: String,
    #[serde(rename = "self")]
    pub self_url: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssueFields {
    pub summary: String,
    /// Atlassian Document Format
    #[schema(value_type = Object)]
    pub description: Option<Value>,
    pub issuetype: IssueTypeRef,
    pub priority: NamedRef,
    pub status: StatusRef,
    pub assignee: Option<UserRef>,
    pub reporter: Option<UserRef>,
    pub labels: Vec<String>,
    pub components: Vec<ComponentRef>,
    pub project: ProjectRef,
    pub attachment: Vec<AttachmentResponse>,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssueTypeRef {
    pub id: String,
    pub name: String,
    pub subtask: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusRef {
    pub id: String,
    pub name: String,
    #[serde(rename = "statusCategory")]
    pub status_category: StatusCategory,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusCategory {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub account_id: String,
    pub display_name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComponentRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectRef {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: String,
    #[serde(rename = "self")]
    pub self_url: String,
    pub filename: String,
    pub author: UserRef,
    pub created: String,
    pub size: i64,
    pub mime_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub expand: String,
    pub start_at: usize,
    pub max_results: usize,
    pub total: usize,
    pub issues: Vec<IssueResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransitionsResponse {
    pub expand: String,
    pub transitions: Vec<TransitionResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransitionResponse {
    pub id: String,
    pub name: String,
    pub to: StatusRef,
}

/// Jira renders timestamps as `2024-01-15T09:00:00.000+0000`
pub fn jira_timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string()
}

/// Wrap a plain-text description in a minimal ADF document; ADF passes through
pub fn to_adf(description: &Value) -> Option<Value> {
    match description {
        Value::Null => None,
        Value::String(text) => {
            let paragraphs: Vec<Value> = text
                .split("\n\n")
                .filter(|p| !p.trim().is_empty())
                .map(|p| json!({"type": "paragraph", "content": [{"type": "text", "text": p}]}))
                .collect();
            Some(json!({"type": "doc", "version": 1, "content": paragraphs}))
        }
        other => Some(other.clone()),
    }
}

pub fn user_ref(name: &str) -> UserRef {
    UserRef {
        account_id: name.to_string(),
        display_name: name.to_string(),
        active: true,
    }
}

pub fn status_ref(status: &Status) -> StatusRef {
    StatusRef {
        id: status.id.to_string(),
        name: status.name.to_string(),
        status_category: StatusCategory {
            key: status.category_key.to_string(),
            name: status.category_name.to_string(),
        },
    }
}

pub fn shape_attachment(ctx: &JiraContext, attachment: &Attachment) -> AttachmentResponse {
    let url = ctx.attachment_url(attachment.id);
    AttachmentResponse {
        id: attachment.id.to_string(),
        content: format!("{}/content", url),
        self_url: url,
        filename: attachment.filename.clone(),
        author: user_ref(&attachment.author),
        created: jira_timestamp(&attachment.created_at),
        size: attachment.size,
        mime_type: attachment.mime_type.clone(),
    }
}

/// Shape a stored issue the way `GET /rest/api/3/issue/{key}` returns it
pub fn shape_issue(ctx: &JiraContext, issue: &Issue, attachments: &[Attachment]) -> IssueResponse {
    let issue_type = lookups::issue_type(&issue.issue_type);
    let priority = lookups::priority(&issue.priority);
    let status = lookups::status(&issue.status);

    IssueResponse {
        id: issue.id.to_string(),
        key: issue.key.clone(),
        self_url: ctx.issue_url(issue.id),
        fields: IssueFields {
            summary: issue.summary.clone(),
            description: issue.description.as_ref().and_then(to_adf),
            issuetype: IssueTypeRef {
                id: issue_type.map(|t| t.id).unwrap_or_default().to_string(),
                name: issue.issue_type.clone(),
                subtask: issue_type.is_some_and(|t| t.subtask),
            },
            priority: NamedRef {
                id: priority.map(|p| p.id).unwrap_or_default().to_string(),
                name: issue.priority.clone(),
            },
            status: match status {
                Some(status) => status_ref(status),
                None => StatusRef {
                    id: String::new(),
                    name: issue.status.clone(),
                    status_category: StatusCategory {
                        key: "undefined".to_string(),
                        name: "No Category".to_string(),
                    },
                },
            },
            assignee: issue.assignee.as_deref().map(user_ref),
            reporter: issue.reporter.as_deref().map(user_ref),
            labels: issue.label_list(),
            components: issue
                .component_list()
                .into_iter()
                .map(|name| ComponentRef { name })
                .collect(),
            project: ProjectRef {
                key: issue.project_key.clone(),
            },
            attachment: attachments.iter().map(|a| shape_attachment(ctx, a)).collect(),
            created: jira_timestamp(&issue.created_at),
            updated: jira_timestamp(&issue.updated_at),
        },
    }
}

pub fn shape_transition(transition: &Transition) -> TransitionResponse {
    let to = lookups::status(transition.to)
        .map(status_ref)
        .unwrap_or_else(|| StatusRef {
            id: String::new(),
            name: transition.to.to_string(),
            status_category: StatusCategory {
                key: "undefined".to_string(),
                name: "No Category".to_string(),
            },
        });
    TransitionResponse {
        id: transition.id.to_string(),
        name: transition.name.to_string(),
        to,
    }
}

/// Validate a create body into a [`NewIssue`]
pub fn parse_new_issue(body: &Value, default_project: &str) -> Result<NewIssue, WebError> {
    let fields = fields_object(body)?;
    let mut errors = Vec::new();

    let summary = match fields.get("summary").and_then(Value::as_str).map(str::trim) {
        Some(summary) if !summary.is_empty() => summary.to_string(),
        _ => {
            errors.push(FieldError::new(
                "summary",
                "You must specify a summary of the issue.",
                "REQUIRED",
            ));
            String::new()
        }
    };

    let issue_type = match fields.get("issuetype") {
        None | Some(Value::Null) => {
            errors.push(FieldError::new("issuetype", "Specify an issue type", "REQUIRED"));
            None
        }
        Some(value) => resolve_issue_type(value, &mut errors),
    };

    let project_key = match fields.get("project") {
        None | Some(Value::Null) => Some(default_project.to_string()),
        Some(value) => match lookup_name(value, &["key", "id"]) {
            Some(key) if is_project_key(&key.to_ascii_uppercase()) => Some(key.to_ascii_uppercase()),
            _ => {
                errors.push(FieldError::invalid("project", "Specify a valid project ID or key"));
                None
            }
        },
    };

    let priority = match fields.get("priority") {
        None | Some(Value::Null) => Some(lookups::DEFAULT_PRIORITY.to_string()),
        Some(value) => resolve_priority(value, &mut errors),
    };

    let description = parse_description(fields, &mut errors).flatten();
    let assignee = parse_user(fields, "assignee", &mut errors).flatten();
    let reporter = parse_user(fields, "reporter", &mut errors).flatten();
    let labels = parse_labels(fields, &mut errors).unwrap_or_default();
    let components = parse_components(fields, &mut errors).unwrap_or_default();

    match (errors.is_empty(), project_key, issue_type, priority) {
        (true, Some(project_key), Some(issue_type), Some(priority)) => Ok(NewIssue {
            project_key,
            summary,
            description,
            issue_type,
            priority,
            assignee,
            reporter,
            labels,
            components,
        }),
        _ => Err(WebError::validation(errors)),
    }
}

/// Validate an edit body into [`IssueChanges`]; absent fields stay untouched
pub fn parse_issue_changes(body: &Value) -> Result<IssueChanges, WebError> {
    let fields = fields_object(body)?;
    let mut errors = Vec::new();
    let mut changes = IssueChanges::default();

    if let Some(value) = fields.get("summary") {
        match value.as_str().map(str::trim) {
            Some(summary) if !summary.is_empty() => changes.summary = Some(summary.to_string()),
            _ => errors.push(FieldError::new(
                "summary",
                "You must specify a summary of the issue.",
                "REQUIRED",
            )),
        }
    }
    if let Some(value) = fields.get("issuetype") {
        changes.issue_type = resolve_issue_type(value, &mut errors);
    }
    if let Some(value) = fields.get("priority") {
        changes.priority = resolve_priority(value, &mut errors);
    }
    if fields.contains_key("project") {
        errors.push(FieldError::invalid("project", "Issues cannot be moved between projects"));
    }

    changes.description = parse_description(fields, &mut errors);
    changes.assignee = parse_user(fields, "assignee", &mut errors);
    changes.reporter = parse_user(fields, "reporter", &mut errors);
    changes.labels = parse_labels(fields, &mut errors);
    changes.components = parse_components(fields, &mut errors);

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(WebError::validation(errors))
    }
}

fn fields_object(body: &Value) -> Result<&Map<String, Value>, WebError> {
    body.get("fields").and_then(Value::as_object).ok_or_else(|| {
        WebError::validation_single("fields", "Request body must contain a 'fields' object", "REQUIRED")
    })
}

/// `{"name": ..}`, `{"id": ..}` or a bare string
fn lookup_name<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => keys.iter().find_map(|key| map.get(*key).and_then(Value::as_str)),
        _ => None,
    }
}

fn resolve_issue_type(value: &Value, errors: &mut Vec<FieldError>) -> Option<String> {
    match lookup_name(value, &["name", "id"]).and_then(lookups::issue_type) {
        Some(issue_type) => Some(issue_type.name.to_string()),
        None => {
            errors.push(FieldError::invalid("issuetype", "Specify a valid issue type"));
            None
        }
    }
}

fn resolve_priority(value: &Value, errors: &mut Vec<FieldError>) -> Option<String> {
    match lookup_name(value, &["name", "id"]).and_then(lookups::priority) {
        Some(priority) => Some(priority.name.to_string()),
        None => {
            errors.push(FieldError::invalid("priority", "Specify a valid priority"));
            None
        }
    }
}

fn parse_description(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<Option<Value>> {
    match fields.get("description")? {
        Value::Null => Some(None),
        value @ (Value::String(_) | Value::Object(_)) => Some(Some(value.clone())),
        _ => {
            errors.push(FieldError::invalid(
                "description",
                "Description must be a string or an Atlassian Document Format object",
            ));
            None
        }
    }
}

fn parse_user(fields: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<Option<String>> {
    match fields.get(field)? {
        Value::Null => Some(None),
        value => match lookup_name(value, &["accountId", "name", "emailAddress"]) {
            Some(name) if !name.trim().is_empty() => Some(Some(name.trim().to_string())),
            _ => {
                errors.push(FieldError::invalid(field, format!("Specify a valid {}", field)));
                None
            }
        },
    }
}

fn parse_labels(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<Vec<String>> {
    let value = fields.get("labels")?;
    let Some(items) = value.as_array() else {
        errors.push(FieldError::invalid("labels", "Labels must be an array of strings"));
        return None;
    };

    let mut labels: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(label) if !label.is_empty() && !label.contains(char::is_whitespace) => {
                if !labels.iter().any(|l| l == label) {
                    labels.push(label.to_string());
                }
            }
            _ => {
                errors.push(FieldError::invalid("labels", "Labels cannot contain spaces"));
                return None;
            }
        }
    }
    Some(labels)
}

fn parse_components(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<Vec<String>> {
    let value = fields.get("components")?;
    let names: Option<Vec<String>> = value.as_array().and_then(|items| {
        items
            .iter()
            .map(|item| lookup_name(item, &["name"]).map(str::to_string))
            .collect()
    });
    if names.is_none() {
        errors.push(FieldError::invalid("components", "Components must be a list of {\"name\": ..} objects"));
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_minimal_issue_uses_defaults() {
        let body = json!({"fields": {"summary": "Crash on start", "issuetype": {"name": "bug"}}});
        let issue = parse_new_issue(&body, "QA").unwrap();
        assert_eq!(issue.project_key, "QA");
        assert_eq!(issue.issue_type, "Bug");
        assert_eq!(issue.priority, "Medium");
        assert!(issue.labels.is_empty());
    }

    #[test]
    fn test_parse_reports_every_missing_field() {
        let err = parse_new_issue(&json!({"fields": {}}), "QA").unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["summary", "issuetype"]);

        let err = parse_new_issue(&json!({"summary": "no fields wrapper"}), "QA").unwrap_err();
        assert_eq!(err.field_errors()[0].field, "fields");
    }

    #[test]
    fn test_parse_rejects_unknown_lookups() {
        let body = json!({"fields": {
            "summary": "x",
            "issuetype": {"name": "Incident"},
            "priority": {"name": "Urgent"},
            "labels": ["has space"],
            "project": {"key": "1QA"}
        }});
        let err = parse_new_issue(&body, "QA").unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["issuetype", "project", "priority", "labels"]);
    }

    #[test]
    fn test_parse_full_issue() {
        let body = json!({"fields": {
            "project": {"key": "ops"},
            "summary": "  Rotate certificates ",
            "issuetype": {"id": "10002"},
            "priority": {"id": "1"},
            "description": {"type": "doc", "version": 1, "content": []},
            "assignee": {"accountId": "alice"},
            "labels": ["infra", "infra", "certs"],
            "components": [{"name": "Platform"}, "Security"]
        }});
        let issue = parse_new_issue(&body, "QA").unwrap();
        assert_eq!(issue.project_key, "OPS");
        assert_eq!(issue.summary, "Rotate certificates");
        assert_eq!(issue.issue_type, "Task");
        assert_eq!(issue.priority, "Highest");
        assert_eq!(issue.assignee.as_deref(), Some("alice"));
        assert_eq!(issue.labels, vec!["infra", "certs"]);
        assert_eq!(issue.components, vec!["Platform", "Security"]);
    }

    #[test]
    fn test_changes_distinguish_null_from_absent() {
        let changes = parse_issue_changes(&json!({"fields": {"assignee": null, "labels": []}})).unwrap();
        assert_eq!(changes.assignee, Some(None));
        assert_eq!(changes.labels, Some(vec![]));
        assert!(changes.summary.is_none());
        assert!(changes.reporter.is_none());

        assert!(parse_issue_changes(&json!({"fields": {"summary": ""}})).is_err());
    }

    #[test]
    fn test_plain_description_becomes_adf() {
        let adf = to_adf(&json!("First paragraph\n\nSecond")).unwrap();
        assert_eq!(adf["type"], "doc");
        assert_eq!(adf["content"].as_array().unwrap().len(), 2);
        assert_eq!(adf["content"][1]["content"][0]["text"], "Second");

        let existing = json!({"type": "doc", "version": 1, "content": []});
        assert_eq!(to_adf(&existing), Some(existing.clone()));
        assert_eq!(to_adf(&Value::Null), None);
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        assert_eq!(jira_timestamp(&at), "2024-01-15T09:00:00.000+0000");
    }

    #[test]
    fn test_project_key_is_normalized_then_checked() {
        let body = |key: &str| json!({"fields": {"summary": "x", "issuetype": {"name": "Task"}, "project": {"key": key}}});

        assert_eq!(parse_new_issue(&body("ops2"), "QA").unwrap().project_key, "OPS2");
        for bad in ["Q", "QA-1", "Q A"] {
            let err = parse_new_issue(&body(bad), "QA").unwrap_err();
            assert_eq!(err.field_errors()[0].field, "project");
        }
    }
}
