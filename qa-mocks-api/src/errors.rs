//! Handler errors rendered in each vendor's error envelope

use std::fmt;
use std::marker::PhantomData;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use qa_mocks_storage::StorageError;
use qa_mocks_web::{ErrorShape, WebError};
use serde_json::{json, Map, Value};

/// A [`WebError`] that knows which vendor shape to answer with
pub struct ApiError<S> {
    inner: WebError,
    _shape: PhantomData<fn() -> S>,
}

impl<S> ApiError<S> {
    pub fn new(inner: WebError) -> Self {
        Self {
            inner,
            _shape: PhantomData,
        }
    }

    pub fn inner(&self) -> &WebError {
        &self.inner
    }
}

impl<S> fmt::Debug for ApiError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiError").field(&self.inner).finish()
    }
}

impl<S: ErrorShape> IntoResponse for ApiError<S> {
    fn into_response(self) -> Response {
        S::respond(self.inner)
    }
}

impl<S> From<WebError> for ApiError<S> {
    fn from(error: WebError) -> Self {
        Self::new(error)
    }
}

impl<S> From<StorageError> for ApiError<S> {
    fn from(error: StorageError) -> Self {
        Self::new(storage_to_web(error))
    }
}

impl<S> From<JsonRejection> for ApiError<S> {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.into())
    }
}

impl<S> From<QueryRejection> for ApiError<S> {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.into())
    }
}

impl<S> From<PathRejection> for ApiError<S> {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.into())
    }
}

impl<S> From<MultipartRejection> for ApiError<S> {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.into())
    }
}

impl<S> From<MultipartError> for ApiError<S> {
    fn from(error: MultipartError) -> Self {
        Self::new(error.into())
    }
}

/// Map storage failures onto HTTP errors
///
/// Missing rows become 404, rejected references become field validation
/// errors, everything else is an internal error.
pub fn storage_to_web(error: StorageError) -> WebError {
    match error {
        StorageError::NotFound { entity, id } => {
            WebError::not_found(entity, format!("{} {} not found", capitalize(entity), id))
        }
        StorageError::Constraint { field, message } => WebError::validation_single(field, message, "INVALID"),
        other => WebError::internal(other.to_string()),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Jira: `{"errorMessages": [..], "errors": {field: message}}`
pub struct JiraShape;

impl ErrorShape for JiraShape {
    fn body(error: &WebError) -> Value {
        let field_errors = error.field_errors();
        let mut errors = Map::new();
        for field in field_errors {
            errors.insert(field.field.clone(), Value::String(field.message.clone()));
        }

        let messages: Vec<String> = if field_errors.is_empty() {
            vec![error.public_message()]
        } else {
            Vec::new()
        };

        json!({
            "errorMessages": messages,
            "errors": errors,
            "code": error.error_code(),
        })
    }
}

/// TestRail: flat `{"error": message, "code": CODE}` with `fields` on validation
pub struct TestRailShape;

impl ErrorShape for TestRailShape {
    fn body(error: &WebError) -> Value {
        let mut body = json!({
            "error": error.public_message(),
            "code": error.error_code(),
        });
        if !error.field_errors().is_empty() {
            body["fields"] = json!(error.field_errors());
        }
        body
    }
}

/// Slack: `{"ok": false, "error": "snake_case_code"}`
pub struct SlackShape;

impl SlackShape {
    pub fn code(error: &WebError) -> &'static str {
        match error {
            WebError::Unauthorized { .. } => "not_authed",
            WebError::NotFound { resource, .. } => match resource.as_str() {
                "channel" => "channel_not_found",
                "thread" => "thread_not_found",
                "file" => "file_not_found",
                "message" => "message_not_found",
                _ => "not_found",
            },
            WebError::BadRequest { .. } | WebError::Validation { .. } => "invalid_arguments",
            WebError::RateLimit { .. } => "ratelimited",
            WebError::Internal { .. } => "internal_error",
        }
    }
}

impl ErrorShape for SlackShape {
    fn body(error: &WebError) -> Value {
        let mut body = json!({
            "ok": false,
            "error": Self::code(error),
            "detail": error.public_message(),
        });
        if !error.field_errors().is_empty() {
            let messages: Vec<String> = error
                .field_errors()
                .iter()
                .map(|field| format!("[ERROR] {} [json-pointer:/{}]", field.message, field.field))
                .collect();
            body["response_metadata"] = json!({ "messages": messages });
        }
        body
    }
}

pub type JiraError = ApiError<JiraShape>;
pub type JiraResult<T> = Result<T, JiraError>;
pub type TestRailError = ApiError<TestRailShape>;
pub type TestRailResult<T> = Result<T, TestRailError>;
pub type SlackError = ApiError<SlackShape>;
pub type SlackResult<T> = Result<T, SlackError>;
