pub mod auth;
pub mod cors;
pub mod error_handler;
pub mod rate_limit;
pub mod request_id;

pub use auth::{bearer_token, require_bearer, BearerAuth};
pub use cors::cors_layer;
pub use error_handler::error_handler_middleware;
pub use rate_limit::{rate_limit_middleware, RateLimitState, RateLimiter};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
