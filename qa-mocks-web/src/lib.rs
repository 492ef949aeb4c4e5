//! # QA Mocks Web Utilities
//!
//! The HTTP contract shared by the Jira, TestRail and Slack mocks: one error
//! model rendered in per-vendor shapes, bearer-presence authentication, token
//! bucket rate limiting, request IDs, pagination windows and OpenAPI helpers.
//!
//! ## Example
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use qa_mocks_web::{
//!     errors::StandardShape,
//!     middleware::{cors_layer, request_id_middleware, require_bearer, BearerAuth},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let app: Router = Router::new()
//!     .route("/items", get(|| async { "items" }))
//!     .route_layer(middleware::from_fn_with_state(
//!         BearerAuth::<StandardShape>::new(true),
//!         require_bearer::<StandardShape>,
//!     ))
//!     .layer(middleware::from_fn(request_id_middleware))
//!     .layer(cors_layer());
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:4001").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

pub mod errors;
pub mod extractors;
pub mod middleware;
pub mod openapi;

pub use errors::{ErrorShape, FieldError, StandardShape, WebError, WebResult};
pub use extractors::PageWindow;
