//! Web error types and vendor-specific error bodies
//!
//! Every service reports failures through [`WebError`]. How the error body looks
//! is decided by an [`ErrorShape`], so Jira, TestRail and Slack clients each see
//! the envelope their real vendor would send while status codes stay uniform.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Web-specific error type for HTTP API operations
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Not found: {message}")]
    NotFound { resource: String, message: String },

    #[error("Validation failed: {}", summarize(.errors))]
    Validation { errors: Vec<FieldError> },

    #[error("Rate limit exceeded")]
    RateLimit { retry_after_secs: u64 },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// One rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }

    /// A required field was absent or blank
    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{} is required", field);
        Self::new(field, message, "REQUIRED")
    }

    /// A field was present but its value is not accepted
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, "INVALID")
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadRequest { .. } | WebError::Validation { .. } => StatusCode::BAD_REQUEST,
            WebError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            WebError::NotFound { .. } => StatusCode::NOT_FOUND,
            WebError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
            WebError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            WebError::BadRequest { .. } => "BAD_REQUEST",
            WebError::Unauthorized { .. } => "UNAUTHORIZED",
            WebError::NotFound { .. } => "NOT_FOUND",
            WebError::Validation { .. } => "VALIDATION_ERROR",
            WebError::RateLimit { .. } => "RATE_LIMITED",
            WebError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to API clients
    ///
    /// Internal errors are logged in full but reported generically.
    pub fn public_message(&self) -> String {
        match self {
            WebError::BadRequest { message }
            | WebError::Unauthorized { message }
            | WebError::NotFound { message, .. } => message.clone(),
            WebError::Validation { errors } => summarize(errors),
            WebError::RateLimit { retry_after_secs } => {
                format!("Rate limit exceeded, retry in {}s", retry_after_secs)
            }
            WebError::Internal { .. } => "Internal server error".to_string(),
        }
    }

    /// Field errors carried by a validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            WebError::Validation { errors } => errors,
            _ => &[],
        }
    }
}

/// Renders a [`WebError`] into a vendor's JSON error envelope
pub trait ErrorShape: Send + Sync + 'static {
    /// JSON body for the error
    fn body(error: &WebError) -> Value;

    /// Full response: status code, body and `Retry-After` for rate limiting
    fn respond(error: WebError) -> Response {
        let status = error.status_code();
        if status.is_server_error() {
            tracing::error!("{}", error);
        }

        let mut response = (status, Json(Self::body(&error))).into_response();
        if let WebError::RateLimit { retry_after_secs } = error {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

/// Generic `{"error": {"code", "message", "details"}}` envelope
pub struct StandardShape;

impl ErrorShape for StandardShape {
    fn body(error: &WebError) -> Value {
        match error {
            WebError::Validation { errors } => json!({
                "error": {
                    "code": error.error_code(),
                    "message": error.public_message(),
                    "details": errors,
                }
            }),
            _ => json!({
                "error": {
                    "code": error.error_code(),
                    "message": error.public_message(),
                }
            }),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        StandardShape::respond(self)
    }
}

// Extractor rejections surface as structured errors instead of plain text
impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        WebError::validation_single("body", rejection.body_text(), "INVALID_JSON")
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        WebError::validation_single("query", rejection.body_text(), "INVALID_QUERY")
    }
}

impl From<PathRejection> for WebError {
    fn from(rejection: PathRejection) -> Self {
        WebError::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for WebError {
    fn from(rejection: MultipartRejection) -> Self {
        WebError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for WebError {
    fn from(error: MultipartError) -> Self {
        WebError::bad_request(error.body_text())
    }
}

// Common error constructors
impl WebError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        WebError::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        WebError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, message: impl Into<String>) -> Self {
        WebError::NotFound {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        WebError::Internal {
            message: message.into(),
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        WebError::Validation { errors }
    }

    pub fn validation_single(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        WebError::Validation {
            errors: vec![FieldError::new(field, message, code)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(WebError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebError::not_found("issue", "x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            WebError::validation(vec![FieldError::required("summary")]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::RateLimit { retry_after_secs: 1 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let error = WebError::validation(vec![
            FieldError::required("summary"),
            FieldError::required("issuetype.name"),
        ]);
        assert_eq!(
            error.public_message(),
            "summary is required; issuetype.name is required"
        );
        assert_eq!(error.field_errors().len(), 2);
    }

    #[test]
    fn test_internal_details_are_not_public() {
        let error = WebError::internal("database is locked at /var/data/jira.db");
        assert_eq!(error.public_message(), "Internal server error");
    }

    #[test]
    fn test_standard_shape_body() {
        let body = StandardShape::body(&WebError::validation(vec![FieldError::required("title")]));
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"][0]["field"], "title");
    }

    #[test]
    fn test_rate_limit_response_has_retry_after() {
        let response = StandardShape::respond(WebError::RateLimit { retry_after_secs: 3 });
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "3");
    }
}
