//! TestRail API v2 endpoints
//!
//! Both entry points only normalize the request; the work happens in
//! [`crate::dispatch::execute`].

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{Method, Uri},
    Json,
};
use qa_mocks_web::openapi::{build_document, DocumentedRoute};
use serde_json::Value;
use tracing::{debug, info};
use utoipa::openapi::path::HttpMethod;

use crate::{
    app::TESTRAIL_SERVICE,
    context::TestRailContext,
    dispatch::{self, documented_routes},
    errors::TestRailResult,
    models::common::ResetResponse,
};

/// `/api/v2/<resource>[/<id>...]`
pub async fn modern(
    State(ctx): State<TestRailContext>,
    method: Method,
    uri: Uri,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> TestRailResult<Json<Value>> {
    let call = dispatch::parse_modern(&method, uri.path(), query.as_deref(), &body)?;
    debug!(operation = ?call.operation, "Modern TestRail request");

    Ok(Json(dispatch::execute(&ctx, call).await?))
}

/// `/index.php?/api/v2/<method>/<id>` and the `?case_id=` shortcuts
pub async fn legacy(
    State(ctx): State<TestRailContext>,
    method: Method,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> TestRailResult<Json<Value>> {
    let call = dispatch::parse_legacy(&method, query.as_deref(), &body)?;
    debug!(operation = ?call.operation, "Legacy TestRail request");

    Ok(Json(dispatch::execute(&ctx, call).await?))
}

pub async fn reset(State(ctx): State<TestRailContext>) -> TestRailResult<Json<ResetResponse>> {
    ctx.seed.reset().await?;
    info!("TestRail store reset to seed data");
    Ok(Json(ResetResponse::for_service(TESTRAIL_SERVICE)))
}

pub async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    let extra = [
        (HttpMethod::Get, "/index.php", "Legacy dispatch: ?/api/v2/<method>/<id>", true),
        (HttpMethod::Post, "/index.php", "Legacy dispatch for write methods", true),
        (HttpMethod::Post, "/admin/reset", "Restore seed data", true),
        (HttpMethod::Get, "/health", "Health check", false),
    ]
    .into_iter()
    .map(|(method, path, summary, protected)| DocumentedRoute {
        method,
        path: path.to_string(),
        summary: summary.to_string(),
        tag: if protected { "testrail" } else { "health" }.to_string(),
        protected,
    });

    Json(build_document(
        "TestRail Mock",
        env!("CARGO_PKG_VERSION"),
        "TestRail API v2 subset with modern paths and index.php legacy dispatch",
        documented_routes().into_iter().chain(extra),
    ))
}
