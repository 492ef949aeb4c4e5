//! TestRail request parsing and flat response objects

use std::collections::BTreeMap;

use qa_mocks_storage::testrail::entities::{Case, Project, Run, RunEntry, Section, TestResult};
use qa_mocks_storage::testrail::lookups::{
    self, CasePriority, CaseType, ResultStatus, Template, DEFAULT_PRIORITY_ID, DEFAULT_TEMPLATE_ID,
    DEFAULT_TYPE_ID, STATUS_BLOCKED, STATUS_FAILED, STATUS_PASSED, STATUS_RETEST, STATUS_UNTESTED,
};
use qa_mocks_storage::testrail::{
    CaseChanges, NewCase, NewProject, NewResult, NewRun, NewSection, ProjectStats, SectionStats,
};
use qa_mocks_web::{FieldError, WebError};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Author of results submitted without `created_by`
pub const DEFAULT_RESULT_AUTHOR: &str = "api-user";

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: i32,
    pub name: String,
    pub announcement: Option<String>,
    pub show_announcement: bool,
    pub is_completed: bool,
    pub completed_on: Option<i64>,
    pub created_on: i64,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            announcement: project.announcement,
            show_announcement: project.show_announcement,
            is_completed: project.is_completed,
            completed_on: project.completed_on,
            created_on: project.created_on,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    pub depth: i32,
    pub display_order: i32,
    pub created_on: i64,
}

impl From<Section> for SectionView {
    fn from(section: Section) -> Self {
        Self {
            id: section.id,
            project_id: section.project_id,
            name: section.name,
            description: section.description,
            parent_id: section.parent_id,
            depth: section.depth,
            display_order: section.display_order,
            created_on: section.created_on,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseView {
    pub id: i32,
    pub section_id: i32,
    pub title: String,
    pub template_id: i32,
    pub type_id: i32,
    pub priority_id: i32,
    /// `[{"step": .., "expected": ..}]`
    pub steps: Option<Value>,
    pub expected_result: Option<String>,
    pub preconditions: Option<String>,
    pub estimate: Option<String>,
    pub refs: Option<String>,
    pub created_on: i64,
    pub updated_on: i64,
}

impl From<Case> for CaseView {
    fn from(case: Case) -> Self {
        Self {
            id: case.id,
            section_id: case.section_id,
            title: case.title,
            template_id: case.template_id,
            type_id: case.type_id,
            priority_id: case.priority_id,
            steps: case.steps,
            expected_result: case.expected_result,
            preconditions: case.preconditions,
            estimate: case.estimate,
            refs: case.refs,
            created_on: case.created_on,
            updated_on: case.updated_on,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub id: i32,
    pub case_id: i32,
    pub test_id: Option<i32>,
    pub status_id: i32,
    pub comment: Option<String>,
    pub elapsed: Option<String>,
    pub defects: Option<String>,
    pub created_on: i64,
    pub created_by: String,
}

impl From<TestResult> for ResultView {
    fn from(result: TestResult) -> Self {
        Self {
            id: result.id,
            case_id: result.case_id,
            test_id: result.test_id,
            status_id: result.status_id,
            comment: result.comment,
            elapsed: result.elapsed,
            defects: result.defects,
            created_on: result.created_on,
            created_by: result.created_by,
        }
    }
}

/// A run with per-status counters over its entries
#[derive(Debug, Clone, Serialize)]
pub struct RunView {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub include_all: bool,
    pub is_completed: bool,
    pub completed_on: Option<i64>,
    pub created_on: i64,
    pub passed_count: u32,
    pub blocked_count: u32,
    pub untested_count: u32,
    pub retest_count: u32,
    pub failed_count: u32,
}

impl RunView {
    pub fn new(run: Run, entries: &[RunEntry]) -> Self {
        let count = |status: i32| entries.iter().filter(|e| e.status_id == status).count() as u32;
        Self {
            passed_count: count(STATUS_PASSED),
            blocked_count: count(STATUS_BLOCKED),
            untested_count: count(STATUS_UNTESTED),
            retest_count: count(STATUS_RETEST),
            failed_count: count(STATUS_FAILED),
            id: run.id,
            project_id: run.project_id,
            name: run.name,
            description: run.description,
            include_all: run.include_all,
            is_completed: run.is_completed,
            completed_on: run.completed_on,
            created_on: run.created_on,
        }
    }
}

/// A run entry, which TestRail calls a test
#[derive(Debug, Clone, Serialize)]
pub struct TestView {
    pub id: i32,
    pub run_id: i32,
    pub case_id: i32,
    pub title: String,
    pub status_id: i32,
    pub comment: Option<String>,
    pub elapsed: Option<String>,
}

impl From<RunEntry> for TestView {
    fn from(entry: RunEntry) -> Self {
        Self {
            id: entry.id,
            run_id: entry.run_id,
            case_id: entry.case_id,
            title: entry.title,
            status_id: entry.status_id,
            comment: entry.comment,
            elapsed: entry.elapsed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionStatsView {
    pub section_id: i32,
    pub section_name: String,
    pub case_count: u64,
    pub status_counts: BTreeMap<i32, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    pub project_id: i32,
    pub total_cases: u64,
    pub sections: Vec<SectionStatsView>,
    pub overall_status_counts: BTreeMap<i32, u64>,
}

/// Every known status appears in the counts, zero when unused
fn all_statuses(counts: BTreeMap<i32, u64>) -> BTreeMap<i32, u64> {
    let mut full: BTreeMap<i32, u64> = lookups::STATUSES.iter().map(|s| (s.id, 0)).collect();
    full.extend(counts);
    full
}

impl From<ProjectStats> for StatsView {
    fn from(stats: ProjectStats) -> Self {
        Self {
            project_id: stats.project_id,
            total_cases: stats.total_cases,
            sections: stats
                .sections
                .into_iter()
                .map(|s: SectionStats| SectionStatsView {
                    section_id: s.section_id,
                    section_name: s.section_name,
                    case_count: s.case_count,
                    status_counts: all_statuses(s.status_counts),
                })
                .collect(),
            overall_status_counts: all_statuses(stats.overall_status_counts),
        }
    }
}

pub fn status_view(status: &ResultStatus) -> Value {
    json!({"id": status.id, "name": status.name, "label": status.label, "is_untested": status.is_untested})
}

pub fn case_type_view(case_type: &CaseType) -> Value {
    json!({"id": case_type.id, "name": case_type.name, "is_default": case_type.is_default})
}

pub fn priority_view(priority: &CasePriority) -> Value {
    json!({
        "id": priority.id,
        "name": priority.name,
        "short_name": priority.short_name,
        "is_default": priority.is_default,
    })
}

pub fn template_view(template: &Template) -> Value {
    json!({"id": template.id, "name": template.name, "is_default": template.is_default})
}

pub fn parse_new_project(body: &Value) -> Result<NewProject, WebError> {
    let fields = body_object(body)?;
    let mut errors = Vec::new();

    let name = required_string(fields, "name", &mut errors);
    let announcement = optional_string(fields, "announcement", &mut errors).flatten();
    let show_announcement = optional_bool(fields, "show_announcement", &mut errors).unwrap_or(false);

    finish(errors, || NewProject {
        name,
        announcement,
        show_announcement,
    })
}

pub fn parse_new_section(body: &Value) -> Result<NewSection, WebError> {
    let fields = body_object(body)?;
    let mut errors = Vec::new();

    let name = required_string(fields, "name", &mut errors);
    let description = optional_string(fields, "description", &mut errors).flatten();
    let parent_id = optional_id(fields, "parent_id", &mut errors).flatten();

    finish(errors, || NewSection {
        name,
        description,
        parent_id,
    })
}

pub fn parse_new_case(body: &Value) -> Result<NewCase, WebError> {
    let fields = body_object(body)?;
    let mut errors = Vec::new();

    let title = required_string(fields, "title", &mut errors);
    let template_id = lookup_id(fields, "template_id", |id| lookups::template(id).is_some(), &mut errors);
    let type_id = lookup_id(fields, "type_id", |id| lookups::case_type(id).is_some(), &mut errors);
    let priority_id = lookup_id(fields, "priority_id", |id| lookups::priority(id).is_some(), &mut errors);
    let steps = parse_steps(fields, &mut errors).flatten();
    let expected_result = optional_string(fields, "expected_result", &mut errors).flatten();
    let preconditions = optional_string(fields, "preconditions", &mut errors).flatten();
    let estimate = optional_string(fields, "estimate", &mut errors).flatten();
    let refs = optional_string(fields, "refs", &mut errors).flatten();

    finish(errors, || NewCase {
        title,
        template_id: template_id.unwrap_or(DEFAULT_TEMPLATE_ID),
        type_id: type_id.unwrap_or(DEFAULT_TYPE_ID),
        priority_id: priority_id.unwrap_or(DEFAULT_PRIORITY_ID),
        steps,
        expected_result,
        preconditions,
        estimate,
        refs,
    })
}

/// Partial update; a present `null` clears a nullable field
pub fn parse_case_changes(body: &Value) -> Result<CaseChanges, WebError> {
    let fields = body_object(body)?;
    let mut errors = Vec::new();

    let title = if fields.contains_key("title") {
        Some(required_string(fields, "title", &mut errors))
    } else {
        None
    };

    let changes = CaseChanges {
        section_id: optional_id(fields, "section_id", &mut errors).flatten(),
        title,
        template_id: lookup_id(fields, "template_id", |id| lookups::template(id).is_some(), &mut errors),
        type_id: lookup_id(fields, "type_id", |id| lookups::case_type(id).is_some(), &mut errors),
        priority_id: lookup_id(fields, "priority_id", |id| lookups::priority(id).is_some(), &mut errors),
        steps: parse_steps(fields, &mut errors),
        expected_result: optional_string(fields, "expected_result", &mut errors),
        preconditions: optional_string(fields, "preconditions", &mut errors),
        estimate: optional_string(fields, "estimate", &mut errors),
        refs: optional_string(fields, "refs", &mut errors),
    };

    finish(errors, || changes)
}

pub fn parse_new_result(body: &Value) -> Result<NewResult, WebError> {
    let fields = body_object(body)?;
    let mut errors = Vec::new();

    let status_id = match fields.get("status_id") {
        None | Some(Value::Null) => {
            errors.push(FieldError::new("status_id", "Field :status_id is a required field.", "REQUIRED"));
            None
        }
        Some(value) => match as_id(value).filter(|id| lookups::status(*id).is_some()) {
            Some(id) => Some(id),
            None => {
                errors.push(FieldError::invalid("status_id", "Field :status_id is not a valid status."));
                None
            }
        },
    };
    let comment = optional_string(fields, "comment", &mut errors).flatten();
    let elapsed = optional_string(fields, "elapsed", &mut errors).flatten();
    let defects = optional_string(fields, "defects", &mut errors).flatten();
    let created_by = optional_string(fields, "created_by", &mut errors)
        .flatten()
        .unwrap_or_else(|| DEFAULT_RESULT_AUTHOR.to_string());

    match (errors.is_empty(), status_id) {
        (true, Some(status_id)) => Ok(NewResult {
            status_id,
            comment,
            elapsed,
            defects,
            created_by,
        }),
        _ => Err(WebError::validation(errors)),
    }
}

pub fn parse_new_run(body: &Value) -> Result<NewRun, WebError> {
    let fields = body_object(body)?;
    let mut errors = Vec::new();

    let name = required_string(fields, "name", &mut errors);
    let description = optional_string(fields, "description", &mut errors).flatten();
    let include_all = optional_bool(fields, "include_all", &mut errors).unwrap_or(true);
    let case_ids = match fields.get("case_ids") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => id_list(value, "case_ids", &mut errors),
    };

    finish(errors, || NewRun {
        name,
        description,
        include_all,
        case_ids,
    })
}

/// `{"case_ids": [..]}` for bulk deletion; the list must not be empty
pub fn parse_case_ids(body: &Value) -> Result<Vec<i32>, WebError> {
    let fields = body_object(body)?;
    let mut errors = Vec::new();

    let ids = match fields.get("case_ids") {
        Some(value) => id_list(value, "case_ids", &mut errors),
        None => Vec::new(),
    };
    if errors.is_empty() && ids.is_empty() {
        errors.push(FieldError::new("case_ids", "Field :case_ids is a required field.", "REQUIRED"));
    }

    finish(errors, || ids)
}

fn finish<T>(errors: Vec<FieldError>, build: impl FnOnce() -> T) -> Result<T, WebError> {
    if errors.is_empty() {
        Ok(build())
    } else {
        Err(WebError::validation(errors))
    }
}

fn body_object(body: &Value) -> Result<&Map<String, Value>, WebError> {
    body.as_object()
        .ok_or_else(|| WebError::validation_single("body", "Request body must be a JSON object", "INVALID_JSON"))
}

fn required_string(fields: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> String {
    match fields.get(field).and_then(Value::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => {
            errors.push(FieldError::new(
                field,
                format!("Field :{} is a required field.", field),
                "REQUIRED",
            ));
            String::new()
        }
    }
}

/// Absent gives `None`, `null` gives `Some(None)`
fn optional_string(fields: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<Option<String>> {
    match fields.get(field)? {
        Value::Null => Some(None),
        Value::String(value) => Some(Some(value.clone())),
        _ => {
            errors.push(FieldError::invalid(field, format!("Field :{} must be a string.", field)));
            None
        }
    }
}

fn optional_bool(fields: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<bool> {
    match fields.get(field)? {
        Value::Null => None,
        Value::Bool(value) => Some(*value),
        _ => {
            errors.push(FieldError::invalid(field, format!("Field :{} must be a boolean.", field)));
            None
        }
    }
}

fn optional_id(fields: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<Option<i32>> {
    match fields.get(field)? {
        Value::Null => Some(None),
        value => match as_id(value) {
            Some(id) => Some(Some(id)),
            None => {
                errors.push(invalid_id(field));
                None
            }
        },
    }
}

/// A lookup id that must exist in its static table
fn lookup_id(
    fields: &Map<String, Value>,
    field: &str,
    exists: impl Fn(i32) -> bool,
    errors: &mut Vec<FieldError>,
) -> Option<i32> {
    match fields.get(field)? {
        Value::Null => None,
        value => match as_id(value).filter(|id| exists(*id)) {
            Some(id) => Some(id),
            None => {
                errors.push(invalid_id(field));
                None
            }
        },
    }
}

/// Positive integer given as a number or a numeric string
pub fn as_id(value: &Value) -> Option<i32> {
    let id = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    i32::try_from(id).ok().filter(|id| *id > 0)
}

fn invalid_id(field: &str) -> FieldError {
    FieldError::invalid(field, format!("Field :{} is not a valid ID.", field))
}

fn id_list(value: &Value, field: &str, errors: &mut Vec<FieldError>) -> Vec<i32> {
    let ids: Option<Vec<i32>> = value.as_array().and_then(|items| items.iter().map(as_id).collect());
    ids.unwrap_or_else(|| {
        errors.push(FieldError::invalid(field, format!("Field :{} must be a list of IDs.", field)));
        Vec::new()
    })
}

/// `steps` as `[{step, expected}]`; `custom_steps_separated` uses `content`
fn parse_steps(fields: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<Option<Value>> {
    let (field, text_key, value) = if let Some(value) = fields.get("steps") {
        ("steps", "step", value)
    } else {
        ("custom_steps_separated", "content", fields.get("custom_steps_separated")?)
    };

    let Some(items) = value.as_array() else {
        if value.is_null() {
            return Some(None);
        }
        errors.push(FieldError::invalid(field, format!("Field :{} must be a list of steps.", field)));
        return None;
    };

    let mut steps = Vec::with_capacity(items.len());
    for item in items {
        let step = item.get(text_key).and_then(Value::as_str);
        let expected = item.get("expected").and_then(Value::as_str).unwrap_or_default();
        match step {
            Some(step) => steps.push(json!({"step": step, "expected": expected})),
            None => {
                errors.push(FieldError::invalid(
                    field,
                    format!("Every step needs a '{}' string.", text_key),
                ));
                return None;
            }
        }
    }
    Some(Some(Value::Array(steps)))
}
