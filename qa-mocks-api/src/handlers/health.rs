//! Health check endpoint

use axum::Json;
use tracing::debug;

use crate::models::common::HealthResponse;

/// Liveness probe; never requires a bearer token
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(service: &'static str) -> Json<HealthResponse> {
    debug!(service, "Health check requested");

    Json(HealthResponse::healthy(service))
}
