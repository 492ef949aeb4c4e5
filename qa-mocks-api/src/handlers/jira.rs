//! Jira Cloud REST v3 endpoints

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use qa_mocks_storage::jira::lookups;
use qa_mocks_storage::jira::NewAttachment;
use qa_mocks_web::{openapi::BearerSecurity, FieldError, PageWindow, WebError};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use utoipa::{OpenApi, ToSchema};

use crate::{
    context::JiraContext,
    errors::JiraResult,
    jql::Query as JqlQuery,
    models::common::ResetResponse,
    models::jira::{
        parse_issue_changes, parse_new_issue, shape_attachment, shape_issue, shape_transition, AttachmentResponse,
        CreatedIssue, IssueResponse, SearchQuery, SearchRequest, SearchResponse, TransitionRequest,
        TransitionsResponse,
    },
};

/// Author recorded on uploaded attachments
const ATTACHMENT_AUTHOR: &str = "mock-user";

/// Create or edit body, `{"fields": {...}}`
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueRequest {
    #[schema(value_type = Object)]
    pub fields: Value,
}

/// Multipart upload with one or more `file` parts
#[derive(Debug, ToSchema)]
pub struct AttachmentUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jira Mock",
        description = "Jira Cloud REST v3 subset: issues, transitions, attachments and JQL search"
    ),
    paths(
        crate::handlers::health::health_check,
        create_issue,
        get_issue,
        update_issue,
        delete_issue,
        get_transitions,
        transition_issue,
        add_attachments,
        get_attachment,
        delete_attachment,
        search_issues,
        search_issues_post,
        reset,
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "issues", description = "Issue lifecycle"),
        (name = "search", description = "JQL search"),
        (name = "admin", description = "Fixture management"),
        (name = "health", description = "Liveness")
    )
)]
pub struct JiraApiDoc;

#[utoipa::path(
    post,
    path = "/rest/api/3/issue",
    request_body = IssueRequest,
    responses(
        (status = 201, description = "Issue created", body = CreatedIssue),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Missing bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn create_issue(
    State(ctx): State<JiraContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> JiraResult<(StatusCode, Json<CreatedIssue>)> {
    let Json(body) = payload?;
    let new = parse_new_issue(&body, &ctx.settings.default_project)?;

    let issue = ctx.issues.create(new).await?;
    info!(key = %issue.key, "Created issue");

    Ok((
        StatusCode::CREATED,
        Json(CreatedIssue {
            id: issue.id.to_string(),
            self_url: ctx.issue_url(issue.id),
            key: issue.key,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/rest/api/3/issue/{key}",
    params(("key" = String, Path, description = "Issue key such as QA-1, or numeric id")),
    responses(
        (status = 200, description = "The issue", body = IssueResponse),
        (status = 404, description = "Issue does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn get_issue(
    State(ctx): State<JiraContext>,
    path: Result<Path<String>, PathRejection>,
) -> JiraResult<Json<IssueResponse>> {
    let Path(key) = path?;
    let (issue, attachments) = ctx.issues.get_with_attachments(&key).await.map_err(issue_not_found)?;

    Ok(Json(shape_issue(&ctx, &issue, &attachments)))
}

#[utoipa::path(
    put,
    path = "/rest/api/3/issue/{key}",
    params(("key" = String, Path, description = "Issue key or id")),
    request_body = IssueRequest,
    responses(
        (status = 204, description = "Issue updated"),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "Issue does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn update_issue(
    State(ctx): State<JiraContext>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> JiraResult<StatusCode> {
    let Path(key) = path?;
    let Json(body) = payload?;
    let changes = parse_issue_changes(&body)?;

    let issue = ctx.issues.update(&key, changes).await.map_err(issue_not_found)?;
    info!(key = %issue.key, "Updated issue");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/rest/api/3/issue/{key}",
    params(("key" = String, Path, description = "Issue key or id")),
    responses(
        (status = 204, description = "Issue deleted; its key is never reused"),
        (status = 404, description = "Issue does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn delete_issue(
    State(ctx): State<JiraContext>,
    path: Result<Path<String>, PathRejection>,
) -> JiraResult<StatusCode> {
    let Path(key) = path?;
    ctx.issues.delete(&key).await.map_err(issue_not_found)?;
    info!(key = %key, "Deleted issue");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/rest/api/3/issue/{key}/transitions",
    params(("key" = String, Path, description = "Issue key or id")),
    responses(
        (status = 200, description = "Transitions available from the current status", body = TransitionsResponse),
        (status = 404, description = "Issue does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn get_transitions(
    State(ctx): State<JiraContext>,
    path: Result<Path<String>, PathRejection>,
) -> JiraResult<Json<TransitionsResponse>> {
    let Path(key) = path?;
    let issue = ctx.issues.get(&key).await.map_err(issue_not_found)?;

    Ok(Json(TransitionsResponse {
        expand: "transitions".to_string(),
        transitions: lookups::transitions_from(&issue.status).map(shape_transition).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/rest/api/3/issue/{key}/transitions",
    params(("key" = String, Path, description = "Issue key or id")),
    request_body = TransitionRequest,
    responses(
        (status = 204, description = "Issue moved to the transition's target status"),
        (status = 400, description = "Unknown transition"),
        (status = 404, description = "Issue does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn transition_issue(
    State(ctx): State<JiraContext>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<TransitionRequest>, JsonRejection>,
) -> JiraResult<StatusCode> {
    let Path(key) = path?;
    let Json(request) = payload?;

    let issue = ctx.issues.get(&key).await.map_err(issue_not_found)?;
    let transition = lookups::transitions_from(&issue.status)
        .find(|t| t.id == request.transition.id)
        .ok_or_else(|| {
            WebError::validation(vec![FieldError::invalid(
                "transition",
                format!("Transition id '{}' is not valid for this issue.", request.transition.id),
            )])
        })?;

    ctx.issues.set_status(&key, transition.to).await?;
    info!(key = %issue.key, status = transition.to, "Transitioned issue");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/rest/api/3/issue/{key}/attachments",
    params(("key" = String, Path, description = "Issue key or id")),
    request_body(content = AttachmentUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Metadata of the stored attachments", body = [AttachmentResponse]),
        (status = 400, description = "No file part"),
        (status = 404, description = "Issue does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn add_attachments(
    State(ctx): State<JiraContext>,
    path: Result<Path<String>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> JiraResult<Json<Vec<AttachmentResponse>>> {
    let Path(key) = path?;
    let mut multipart = multipart?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("attachment").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        files.push(NewAttachment {
            filename,
            mime_type,
            size: bytes.len() as i64,
            author: ATTACHMENT_AUTHOR.to_string(),
        });
    }

    if files.is_empty() {
        return Err(WebError::validation(vec![FieldError::required("file")]).into());
    }

    let attachments = ctx
        .issues
        .add_attachments(&key, files)
        .await
        .map_err(issue_not_found)?;
    info!(key = %key, count = attachments.len(), "Added attachments");

    Ok(Json(
        attachments.iter().map(|a| shape_attachment(&ctx, a)).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/rest/api/3/attachment/{id}",
    params(("id" = i32, Path, description = "Attachment id")),
    responses(
        (status = 200, description = "Attachment metadata", body = AttachmentResponse),
        (status = 404, description = "Attachment does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn get_attachment(
    State(ctx): State<JiraContext>,
    path: Result<Path<i32>, PathRejection>,
) -> JiraResult<Json<AttachmentResponse>> {
    let Path(id) = path?;
    let attachment = ctx.issues.get_attachment(id).await?;
    Ok(Json(shape_attachment(&ctx, &attachment)))
}

#[utoipa::path(
    delete,
    path = "/rest/api/3/attachment/{id}",
    params(("id" = i32, Path, description = "Attachment id")),
    responses(
        (status = 204, description = "Attachment removed"),
        (status = 404, description = "Attachment does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn delete_attachment(
    State(ctx): State<JiraContext>,
    path: Result<Path<i32>, PathRejection>,
) -> JiraResult<StatusCode> {
    let Path(id) = path?;
    ctx.issues.delete_attachment(id).await?;
    info!(attachment_id = id, "Deleted attachment");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/rest/api/3/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "One page of matching issues", body = SearchResponse),
        (status = 400, description = "Invalid JQL or paging parameters")
    ),
    security(("bearer_auth" = [])),
    tag = "search"
)]
pub async fn search_issues(
    State(ctx): State<JiraContext>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> JiraResult<Json<SearchResponse>> {
    let Query(query) = query?;
    search(&ctx, query.jql.as_deref(), query.start_at, query.max_results).await
}

#[utoipa::path(
    post,
    path = "/rest/api/3/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "One page of matching issues", body = SearchResponse),
        (status = 400, description = "Invalid JQL or paging parameters")
    ),
    security(("bearer_auth" = [])),
    tag = "search"
)]
pub async fn search_issues_post(
    State(ctx): State<JiraContext>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> JiraResult<Json<SearchResponse>> {
    let Json(request) = payload?;
    search(&ctx, request.jql.as_deref(), request.start_at, request.max_results).await
}

async fn search(
    ctx: &JiraContext,
    jql: Option<&str>,
    start_at: Option<i64>,
    max_results: Option<i64>,
) -> JiraResult<Json<SearchResponse>> {
    let window = PageWindow::from_start_at(start_at, max_results)?;
    let query = JqlQuery::parse(jql.unwrap_or_default()).map_err(|e| WebError::bad_request(e.to_string()))?;

    let (all, mut attachments) = ctx.issues.list_with_attachments().await?;
    let matched = query.apply(all);
    let total = matched.len();

    let issues: Vec<IssueResponse> = window
        .slice(matched)
        .iter()
        .map(|issue| shape_issue(ctx, issue, &attachments.remove(&issue.id).unwrap_or_default()))
        .collect();
    info!(jql = jql.unwrap_or_default(), total, returned = issues.len(), "Searched issues");

    Ok(Json(SearchResponse {
        expand: "schema,names".to_string(),
        start_at: window.offset,
        max_results: window.limit,
        total,
        issues,
    }))
}

#[utoipa::path(
    post,
    path = "/admin/reset",
    responses(
        (status = 200, description = "Store reloaded from the seed fixtures", body = ResetResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn reset(State(ctx): State<JiraContext>) -> JiraResult<Json<ResetResponse>> {
    ctx.seed.reset().await?;
    info!("Jira store reset to seed data");
    Ok(Json(ResetResponse::done()))
}

/// Machine-readable description of this service
pub async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(JiraApiDoc::openapi())
}

/// Jira reports a missing issue without echoing the storage wording
fn issue_not_found(error: qa_mocks_storage::StorageError) -> WebError {
    if error.is_not_found() {
        WebError::not_found("issue", "Issue does not exist or you do not have permission to see it.")
    } else {
        crate::errors::storage_to_web(error)
    }
}
