//! Response types shared by all three services

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Unix time in seconds with millisecond precision
    pub timestamp: f64,
}

impl HealthResponse {
    pub fn healthy(service: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
        }
    }
}

/// Body of `POST /admin/reset`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl ResetResponse {
    pub fn done() -> Self {
        Self {
            status: "reset".to_string(),
            service: None,
        }
    }

    pub fn for_service(service: &str) -> Self {
        Self {
            status: "reset".to_string(),
            service: Some(service.to_string()),
        }
    }
}
