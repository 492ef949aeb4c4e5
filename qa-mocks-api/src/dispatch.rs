//! TestRail request dispatch
//!
//! TestRail clients reach the same operations two ways: clean paths under
//! `/api/v2/` and the legacy `/index.php?/api/v2/<method>/<id>` form where the
//! operation hides inside a query-string key. Both are normalized into a
//! [`Call`] against one route table and run through [`execute`], so storage
//! access and response shaping exist once.

use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::http::Method;
use qa_mocks_storage::testrail::lookups;
use qa_mocks_storage::testrail::CaseFilter;
use qa_mocks_web::openapi::{path_parameters, DocumentedRoute};
use qa_mocks_web::{PageWindow, WebError};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use utoipa::openapi::path::HttpMethod;

use crate::context::TestRailContext;
use crate::errors::TestRailResult;
use crate::models::testrail::{
    self as models, case_type_view, priority_view, status_view, template_view, CaseView, ProjectView, ResultView,
    RunView, SectionView, StatsView, TestView,
};

/// Prefix shared by modern paths and legacy pseudo-paths
pub const API_PREFIX: &str = "/api/v2/";

const CASES_DEFAULT_LIMIT: usize = 50;
const CASES_MAX_LIMIT: usize = 250;
const RESULTS_DEFAULT_LIMIT: usize = 50;
const RESULTS_MAX_LIMIT: usize = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetProjects,
    GetProject,
    AddProject,
    GetSections,
    GetSection,
    AddSection,
    GetCases,
    GetCase,
    AddCase,
    UpdateCase,
    DeleteCase,
    DeleteCases,
    GetResults,
    AddResult,
    AddResultForCase,
    GetRuns,
    GetRun,
    AddRun,
    CloseRun,
    GetTests,
    GetStats,
    GetStatuses,
    GetCaseTypes,
    GetPriorities,
    GetTemplates,
}

impl Operation {
    /// Operations whose single target is a project; a missing id means the
    /// configured default project
    pub fn project_scoped(self) -> bool {
        matches!(
            self,
            Operation::GetSections
                | Operation::AddSection
                | Operation::GetCases
                | Operation::DeleteCases
                | Operation::GetRuns
                | Operation::AddRun
                | Operation::GetStats
                | Operation::GetTemplates
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Verb::Get),
            Method::POST => Some(Verb::Post),
            Method::PUT => Some(Verb::Put),
            Method::DELETE => Some(Verb::Delete),
            _ => None,
        }
    }

    pub fn http_method(self) -> HttpMethod {
        match self {
            Verb::Get => HttpMethod::Get,
            Verb::Post => HttpMethod::Post,
            Verb::Put => HttpMethod::Put,
            Verb::Delete => HttpMethod::Delete,
        }
    }

    fn is_write(self) -> bool {
        self != Verb::Get
    }
}

/// One operation as both dispatch styles see it
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub operation: Operation,
    /// Legacy method name, absent for modern-only aliases
    pub legacy: Option<&'static str>,
    pub verb: Verb,
    /// Modern path after `/api/v2/`
    pub modern: &'static str,
    pub summary: &'static str,
}

impl Route {
    /// Id placeholders in the modern pattern
    pub fn id_names(&self) -> Vec<&'static str> {
        path_parameters(self.modern)
    }

    pub fn arity(&self) -> usize {
        self.id_names().len()
    }

    fn min_arity(&self) -> usize {
        if self.operation.project_scoped() {
            self.arity().saturating_sub(1)
        } else {
            self.arity()
        }
    }
}

const fn route(
    operation: Operation,
    legacy: Option<&'static str>,
    verb: Verb,
    modern: &'static str,
    summary: &'static str,
) -> Route {
    Route {
        operation,
        legacy,
        verb,
        modern,
        summary,
    }
}

use Operation as Op;

/// Route table; earlier entries win when patterns overlap
pub const ROUTES: &[Route] = &[
    route(Op::GetProjects, Some("get_projects"), Verb::Get, "projects", "List projects"),
    route(Op::AddProject, Some("add_project"), Verb::Post, "projects", "Create a project"),
    route(Op::GetProject, Some("get_project"), Verb::Get, "project/{project_id}", "Get a project"),
    route(Op::GetSections, Some("get_sections"), Verb::Get, "sections/{project_id}", "List sections of a project"),
    route(Op::AddSection, Some("add_section"), Verb::Post, "sections/{project_id}", "Create a section"),
    route(Op::GetSection, Some("get_section"), Verb::Get, "section/{section_id}", "Get a section"),
    route(Op::GetCases, Some("get_cases"), Verb::Get, "cases/{project_id}", "List cases of a project"),
    route(Op::AddCase, Some("add_case"), Verb::Post, "cases/{section_id}", "Create a case in a section"),
    route(Op::DeleteCases, None, Verb::Delete, "cases/bulk", "Delete several cases"),
    route(Op::DeleteCases, Some("delete_cases"), Verb::Delete, "cases/{project_id}", "Delete several cases of a project"),
    route(Op::GetCase, Some("get_case"), Verb::Get, "case/{case_id}", "Get a case"),
    route(Op::UpdateCase, Some("update_case"), Verb::Put, "case/{case_id}", "Update a case"),
    route(Op::DeleteCase, Some("delete_case"), Verb::Delete, "case/{case_id}", "Delete a case"),
    route(Op::GetResults, Some("get_results"), Verb::Get, "results/{case_id}", "List results of a case"),
    route(Op::AddResult, Some("add_result"), Verb::Post, "results/{case_id}", "Add a result to a case"),
    route(
        Op::AddResultForCase,
        Some("add_result_for_case"),
        Verb::Post,
        "results_for_case/{run_id}/{case_id}",
        "Add a result for a case in a run",
    ),
    route(Op::GetRuns, Some("get_runs"), Verb::Get, "runs/{project_id}", "List runs of a project"),
    route(Op::AddRun, Some("add_run"), Verb::Post, "runs/{project_id}", "Create a run"),
    route(Op::GetRun, Some("get_run"), Verb::Get, "run/{run_id}", "Get a run"),
    route(Op::CloseRun, Some("close_run"), Verb::Post, "run/{run_id}/close", "Close a run"),
    route(Op::GetTests, Some("get_tests"), Verb::Get, "tests/{run_id}", "List tests of a run"),
    route(Op::GetStats, Some("get_stats"), Verb::Get, "stats/{project_id}", "Case and status statistics"),
    route(Op::GetStatuses, Some("get_statuses"), Verb::Get, "statuses", "List result statuses"),
    route(Op::GetCaseTypes, Some("get_case_types"), Verb::Get, "case_types", "List case types"),
    route(Op::GetCaseTypes, None, Verb::Get, "types", "List case types"),
    route(Op::GetPriorities, Some("get_priorities"), Verb::Get, "priorities", "List priorities"),
    route(Op::GetTemplates, Some("get_templates"), Verb::Get, "templates/{project_id}", "List templates"),
];

/// A normalized TestRail request
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: Operation,
    pub target_id: Option<i32>,
    pub secondary_id: Option<i32>,
    pub params: HashMap<String, String>,
    pub body: Value,
}

/// Resolve a request under `/api/v2/`
///
/// `path` is the full request path. No matching route is a 404.
pub fn parse_modern(method: &Method, path: &str, query: Option<&str>, body: &Bytes) -> Result<Call, WebError> {
    let rest = path.strip_prefix(API_PREFIX).unwrap_or(path).trim_end_matches('/');
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let verb = Verb::from_method(method).ok_or_else(|| no_endpoint(path))?;

    for candidate in ROUTES.iter().filter(|r| r.verb == verb) {
        if let Some(ids) = match_pattern(candidate, &segments) {
            let (target_id, secondary_id) = parse_ids(candidate, &ids)?;
            return Ok(Call {
                operation: candidate.operation,
                target_id,
                secondary_id,
                params: parse_params(query),
                body: parse_body(body)?,
            });
        }
    }

    Err(no_endpoint(path))
}

/// Resolve a `/index.php` request from its raw query string
pub fn parse_legacy(method: &Method, query: Option<&str>, body: &Bytes) -> Result<Call, WebError> {
    let mut pseudo_path = None;
    let mut params = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        if pseudo_path.is_none() && value.is_empty() && key.starts_with(API_PREFIX) {
            pseudo_path = Some(key.into_owned());
        } else {
            params.insert(key.into_owned(), value.into_owned());
        }
    }
    let is_post = *method == Method::POST;

    let Some(pseudo_path) = pseudo_path else {
        return param_style(is_post, params, body);
    };

    let rest = &pseudo_path[API_PREFIX.len()..];
    let mut parts = rest.split('/').filter(|s| !s.is_empty());
    let name = parts.next().unwrap_or_default();
    let raw_ids: Vec<&str> = parts.collect();

    let candidate = ROUTES
        .iter()
        .find(|r| r.legacy == Some(name))
        .ok_or_else(|| WebError::bad_request(format!("Unknown method '{}'", name)))?;

    if candidate.verb.is_write() && !is_post {
        return Err(WebError::bad_request(format!("Method '{}' requires a POST request", name)));
    }
    if raw_ids.len() < candidate.min_arity() || raw_ids.len() > candidate.arity() {
        let expected = candidate
            .id_names()
            .iter()
            .map(|n| format!("/:{}", n))
            .collect::<String>();
        return Err(WebError::bad_request(format!(
            "Method '{}' expects {}{}",
            name, name, expected
        )));
    }

    let (target_id, secondary_id) = parse_ids(candidate, &raw_ids)?;
    Ok(Call {
        operation: candidate.operation,
        target_id,
        secondary_id,
        params,
        body: if is_post { parse_body(body)? } else { json!({}) },
    })
}

/// `?case_id=1` and `?section_id=1` shortcuts
fn param_style(is_post: bool, params: HashMap<String, String>, body: &Bytes) -> Result<Call, WebError> {
    let (operation, field) = match (is_post, params.contains_key("section_id"), params.contains_key("case_id")) {
        (true, true, _) => (Operation::AddCase, "section_id"),
        (true, false, true) => (Operation::AddResult, "case_id"),
        (false, _, true) => (Operation::GetCase, "case_id"),
        _ => return Err(WebError::bad_request("No API method given in the query string")),
    };
    let target_id = parse_id(field, params.get(field).map(String::as_str).unwrap_or_default())?;

    Ok(Call {
        operation,
        target_id: Some(target_id),
        secondary_id: None,
        body: if is_post { parse_body(body)? } else { json!({}) },
        params,
    })
}

/// Raw id segments when `segments` fits the route's pattern
fn match_pattern<'a>(candidate: &Route, segments: &[&'a str]) -> Option<Vec<&'a str>> {
    let pattern: Vec<&str> = candidate.modern.split('/').collect();
    let optional_tail = candidate.operation.project_scoped() && segments.len() + 1 == pattern.len();
    if segments.len() != pattern.len() && !optional_tail {
        return None;
    }

    let mut ids = Vec::new();
    for (index, expected) in pattern.iter().enumerate() {
        let is_placeholder = expected.starts_with('{');
        match segments.get(index) {
            Some(actual) if is_placeholder => ids.push(*actual),
            Some(actual) if actual == expected => {}
            None if is_placeholder && optional_tail => {}
            _ => return None,
        }
    }
    Some(ids)
}

fn parse_ids(candidate: &Route, raw: &[&str]) -> Result<(Option<i32>, Option<i32>), WebError> {
    let names = candidate.id_names();
    let mut ids = Vec::with_capacity(raw.len());
    for (name, value) in names.iter().zip(raw) {
        ids.push(parse_id(name, value)?);
    }
    Ok((ids.first().copied(), ids.get(1).copied()))
}

fn parse_id(field: &str, raw: &str) -> Result<i32, WebError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| WebError::validation_single(field, format!("Field :{} is not a valid ID.", field), "INVALID"))
}

fn parse_params(query: Option<&str>) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .into_owned()
        .collect()
}

/// Empty bodies read as `{}`
fn parse_body(body: &Bytes) -> Result<Value, WebError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body).map_err(|e| {
        WebError::validation_single("body", format!("Request body is not valid JSON: {}", e), "INVALID_JSON")
    })
}

fn no_endpoint(path: &str) -> WebError {
    WebError::not_found("route", format!("No endpoint matches {}", path))
}

/// Route table entries for the OpenAPI document
pub fn documented_routes() -> Vec<DocumentedRoute> {
    ROUTES
        .iter()
        .map(|r| DocumentedRoute {
            method: r.verb.http_method(),
            path: format!("{}{}", API_PREFIX, r.modern),
            summary: match r.legacy {
                Some(name) => format!("{} (legacy: {})", r.summary, name),
                None => r.summary.to_string(),
            },
            tag: "testrail".to_string(),
            protected: true,
        })
        .collect()
}

/// Run a normalized call against the store
pub async fn execute(ctx: &TestRailContext, call: Call) -> TestRailResult<Value> {
    info!(operation = ?call.operation, target_id = ?call.target_id, "TestRail call");

    let store = &ctx.store;
    let project = || call.target_id.unwrap_or(ctx.settings.default_project_id);
    let target = |field: &str| required_target(call.target_id, field);

    let body = match call.operation {
        Op::GetProjects => to_value(
            store
                .list_projects()
                .await?
                .into_iter()
                .map(ProjectView::from)
                .collect::<Vec<_>>(),
        ),
        Op::GetProject => to_value(ProjectView::from(store.get_project(target("project_id")?).await?)),
        Op::AddProject => {
            let new = models::parse_new_project(&call.body)?;
            to_value(ProjectView::from(store.add_project(new).await?))
        }
        Op::GetSections => to_value(
            store
                .list_sections(project())
                .await?
                .into_iter()
                .map(SectionView::from)
                .collect::<Vec<_>>(),
        ),
        Op::GetSection => to_value(SectionView::from(store.get_section(target("section_id")?).await?)),
        Op::AddSection => {
            let new = models::parse_new_section(&call.body)?;
            to_value(SectionView::from(store.add_section(project(), new).await?))
        }
        Op::GetCases => {
            let filter = CaseFilter {
                section_id: id_param(&call.params, "section_id")?,
                type_id: id_param(&call.params, "type_id")?,
                priority_id: id_param(&call.params, "priority_id")?,
            };
            let window = PageWindow::from_limit_offset(
                int_param(&call.params, "limit")?,
                int_param(&call.params, "offset")?,
                CASES_DEFAULT_LIMIT,
                CASES_MAX_LIMIT,
            )?;
            let cases = store.list_cases(project(), filter).await?;
            to_value(window.slice(cases).into_iter().map(CaseView::from).collect::<Vec<_>>())
        }
        Op::GetCase => to_value(CaseView::from(store.get_case(target("case_id")?).await?)),
        Op::AddCase => {
            let section_id = target("section_id")?;
            let new = models::parse_new_case(&call.body)?;
            to_value(CaseView::from(store.add_case(section_id, new).await?))
        }
        Op::UpdateCase => {
            let case_id = target("case_id")?;
            let changes = models::parse_case_changes(&call.body)?;
            to_value(CaseView::from(store.update_case(case_id, changes).await?))
        }
        Op::DeleteCase => {
            let case_id = target("case_id")?;
            store.delete_case(case_id).await?;
            json!({ "message": format!("Case {} deleted", case_id) })
        }
        Op::DeleteCases => delete_cases(ctx, &call).await?,
        Op::GetResults => {
            let case_id = target("case_id")?;
            let window = PageWindow::from_limit_offset(
                int_param(&call.params, "limit")?,
                None,
                RESULTS_DEFAULT_LIMIT,
                RESULTS_MAX_LIMIT,
            )?;
            let results = store.list_results(case_id, window.limit as u64).await?;
            to_value(results.into_iter().map(ResultView::from).collect::<Vec<_>>())
        }
        Op::AddResult => {
            let case_id = target("case_id")?;
            let new = models::parse_new_result(&call.body)?;
            to_value(ResultView::from(store.add_result(case_id, new).await?))
        }
        Op::AddResultForCase => {
            let run_id = target("run_id")?;
            let case_id = required_target(call.secondary_id, "case_id")?;
            let new = models::parse_new_result(&call.body)?;
            to_value(ResultView::from(store.add_result_for_case(run_id, case_id, new).await?))
        }
        Op::GetRuns => to_value(
            store
                .list_runs(project())
                .await?
                .into_iter()
                .map(|(run, entries)| RunView::new(run, &entries))
                .collect::<Vec<_>>(),
        ),
        Op::GetRun => {
            let (run, entries) = store.get_run(target("run_id")?).await?;
            to_value(RunView::new(run, &entries))
        }
        Op::AddRun => {
            let new = models::parse_new_run(&call.body)?;
            let (run, entries) = store.add_run(project(), new).await?;
            to_value(RunView::new(run, &entries))
        }
        Op::CloseRun => {
            let (run, entries) = store.close_run(target("run_id")?).await?;
            to_value(RunView::new(run, &entries))
        }
        Op::GetTests => to_value(
            store
                .run_entries(target("run_id")?)
                .await?
                .into_iter()
                .map(TestView::from)
                .collect::<Vec<_>>(),
        ),
        Op::GetStats => to_value(StatsView::from(store.stats(project()).await?)),
        Op::GetStatuses => Value::Array(lookups::STATUSES.iter().map(status_view).collect()),
        Op::GetCaseTypes => Value::Array(lookups::CASE_TYPES.iter().map(case_type_view).collect()),
        Op::GetPriorities => Value::Array(lookups::PRIORITIES.iter().map(priority_view).collect()),
        Op::GetTemplates => {
            store.get_project(project()).await?;
            Value::Array(lookups::TEMPLATES.iter().map(template_view).collect())
        }
    };

    Ok(body)
}

/// Bulk delete; a project target limits deletion to that project's cases
async fn delete_cases(ctx: &TestRailContext, call: &Call) -> TestRailResult<Value> {
    let requested = models::parse_case_ids(&call.body)?;

    let outcome = ctx.store.bulk_delete_cases(call.target_id, &requested).await?;

    Ok(json!({
        "message": format!("Deleted {} case(s)", outcome.deleted.len()),
        "deleted_case_ids": outcome.deleted,
        "not_found_case_ids": outcome.missing,
    }))
}

fn required_target(id: Option<i32>, field: &str) -> Result<i32, WebError> {
    id.ok_or_else(|| {
        WebError::validation_single(field, format!("Field :{} is a required field.", field), "REQUIRED")
    })
}

fn id_param(params: &HashMap<String, String>, field: &str) -> Result<Option<i32>, WebError> {
    params.get(field).map(|raw| parse_id(field, raw)).transpose()
}

fn int_param(params: &HashMap<String, String>, field: &str) -> Result<Option<i64>, WebError> {
    params
        .get(field)
        .map(|raw| {
            raw.parse::<i64>().map_err(|_| {
                WebError::validation_single(field, format!("Field :{} must be an integer.", field), "INVALID_QUERY")
            })
        })
        .transpose()
}

fn to_value<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Bytes {
        Bytes::new()
    }

    #[test]
    fn test_legacy_pseudo_path() {
        let call = parse_legacy(&Method::GET, Some("/api/v2/get_case/7"), &empty()).unwrap();
        assert_eq!(call.operation, Operation::GetCase);
        assert_eq!(call.target_id, Some(7));
        assert!(call.params.is_empty());

        let call = parse_legacy(
            &Method::GET,
            Some("/api/v2/get_cases/1&section_id=2&limit=5"),
            &empty(),
        )
        .unwrap();
        assert_eq!(call.operation, Operation::GetCases);
        assert_eq!(call.params["section_id"], "2");
        assert_eq!(call.params["limit"], "5");
    }

    #[test]
    fn test_legacy_two_ids_and_body() {
        let body = Bytes::from_static(br#"{"status_id": 1}"#);
        let call = parse_legacy(&Method::POST, Some("/api/v2/add_result_for_case/3/9"), &body).unwrap();
        assert_eq!(call.operation, Operation::AddResultForCase);
        assert_eq!((call.target_id, call.secondary_id), (Some(3), Some(9)));
        assert_eq!(call.body["status_id"], 1);
    }

    #[test]
    fn test_legacy_param_style() {
        let call = parse_legacy(&Method::GET, Some("case_id=4"), &empty()).unwrap();
        assert_eq!((call.operation, call.target_id), (Operation::GetCase, Some(4)));

        let call = parse_legacy(&Method::POST, Some("section_id=2"), &empty()).unwrap();
        assert_eq!((call.operation, call.target_id), (Operation::AddCase, Some(2)));

        let call = parse_legacy(&Method::POST, Some("case_id=2"), &empty()).unwrap();
        assert_eq!(call.operation, Operation::AddResult);

        assert!(parse_legacy(&Method::GET, None, &empty()).is_err());
    }

    #[test]
    fn test_legacy_rejections() {
        let err = parse_legacy(&Method::GET, Some("/api/v2/add_case/1"), &empty()).unwrap_err();
        assert!(err.public_message().contains("POST"));

        let err = parse_legacy(&Method::GET, Some("/api/v2/get_case/abc"), &empty()).unwrap_err();
        assert_eq!(err.public_message(), "Field :case_id is not a valid ID.");

        assert!(parse_legacy(&Method::GET, Some("/api/v2/get_case"), &empty()).is_err());
        assert!(parse_legacy(&Method::GET, Some("/api/v2/get_case/1/2"), &empty()).is_err());
        assert!(parse_legacy(&Method::GET, Some("/api/v2/launch_rocket/1"), &empty()).is_err());

        let bad = Bytes::from_static(b"{not json");
        assert!(parse_legacy(&Method::POST, Some("/api/v2/add_case/1"), &bad).is_err());
    }

    #[test]
    fn test_project_scoped_default() {
        let call = parse_legacy(&Method::GET, Some("/api/v2/get_sections"), &empty()).unwrap();
        assert_eq!(call.operation, Operation::GetSections);
        assert_eq!(call.target_id, None);

        let call = parse_modern(&Method::GET, "/api/v2/runs", None, &empty()).unwrap();
        assert_eq!((call.operation, call.target_id), (Operation::GetRuns, None));
    }

    #[test]
    fn test_modern_paths() {
        let call = parse_modern(&Method::PUT, "/api/v2/case/5", None, &empty()).unwrap();
        assert_eq!((call.operation, call.target_id), (Operation::UpdateCase, Some(5)));

        let call = parse_modern(&Method::DELETE, "/api/v2/cases/bulk", None, &empty()).unwrap();
        assert_eq!((call.operation, call.target_id), (Operation::DeleteCases, None));

        let call = parse_modern(&Method::POST, "/api/v2/run/2/close", None, &empty()).unwrap();
        assert_eq!((call.operation, call.target_id), (Operation::CloseRun, Some(2)));

        let call = parse_modern(&Method::GET, "/api/v2/types", None, &empty()).unwrap();
        assert_eq!(call.operation, Operation::GetCaseTypes);

        let call = parse_modern(&Method::GET, "/api/v2/cases/1", Some("offset=10"), &empty()).unwrap();
        assert_eq!(call.params["offset"], "10");

        let err = parse_modern(&Method::GET, "/api/v2/nothing/1", None, &empty()).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
        assert!(parse_modern(&Method::PATCH, "/api/v2/case/1", None, &empty()).is_err());
    }

    #[test]
    fn test_both_styles_agree() {
        let body = Bytes::from_static(br#"{"title": "Checkout works"}"#);
        let legacy = parse_legacy(&Method::POST, Some("/api/v2/add_case/1"), &body).unwrap();
        let modern = parse_modern(&Method::POST, "/api/v2/cases/1", None, &body).unwrap();
        assert_eq!(legacy, modern);
    }

    #[test]
    fn test_route_table_legacy_names_unique() {
        let mut names: Vec<&str> = ROUTES.iter().filter_map(|r| r.legacy).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(documented_routes().len(), ROUTES.len());
    }
}
