//! Bearer-presence authentication
//!
//! The mocks never validate token contents. A request is authenticated when it
//! carries `Authorization: Bearer <non-empty token>`; the scheme is matched
//! case-insensitively. Failures are rendered in the calling service's error shape.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use qa_mocks_config::AuthSettings;
use std::marker::PhantomData;
use tracing::warn;

use crate::errors::{ErrorShape, WebError};

/// State for [`require_bearer`]
#[derive(Debug)]
pub struct BearerAuth<S> {
    pub required: bool,
    shape: PhantomData<fn() -> S>,
}

impl<S> BearerAuth<S> {
    pub fn new(required: bool) -> Self {
        Self {
            required,
            shape: PhantomData,
        }
    }
}

impl<S> Clone for BearerAuth<S> {
    fn clone(&self) -> Self {
        Self::new(self.required)
    }
}

impl<S> From<&AuthSettings> for BearerAuth<S> {
    fn from(settings: &AuthSettings) -> Self {
        Self::new(settings.required)
    }
}

/// Extract the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject requests without a bearer token before they reach any handler
pub async fn require_bearer<S: ErrorShape>(
    State(auth): State<BearerAuth<S>>,
    request: Request,
    next: Next,
) -> Response {
    if !auth.required || bearer_token(request.headers()).is_some() {
        return next.run(request).await;
    }

    let message = if request.headers().contains_key(header::AUTHORIZATION) {
        "Authorization header must use the Bearer scheme with a non-empty token"
    } else {
        "Missing Authorization header"
    };
    warn!(
        method = %request.method(),
        path = %request.uri().path(),
        "Rejected unauthenticated request"
    );

    S::respond(WebError::unauthorized(message))
}
