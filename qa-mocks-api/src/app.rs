//! Router assembly for the three mock services

use std::sync::Arc;

use axum::{
    http::Uri,
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use qa_mocks_config::{AuthSettings, MockConfig, RateLimitSettings};
use qa_mocks_web::middleware::{
    cors_layer, error_handler_middleware, rate_limit_middleware, request_id_middleware, require_bearer,
    BearerAuth, RateLimitState, RateLimiter,
};
use qa_mocks_web::{ErrorShape, WebError};
use tower_http::trace::TraceLayer;

use crate::{
    context::{JiraContext, SlackContext, TestRailContext},
    errors::{JiraShape, SlackShape, TestRailShape},
    handlers::{self, health::health_check},
};

pub const JIRA_SERVICE: &str = "jira-mock";
pub const TESTRAIL_SERVICE: &str = "testrail-mock";
pub const SLACK_SERVICE: &str = "slack-mock";

/// Application configuration shared by every service router
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bearer-presence check on every route except `/health`
    pub auth: AuthSettings,
    pub rate_limit: RateLimitSettings,
    /// Enable CORS middleware
    pub enable_cors: bool,
    /// Enable request ID tracking
    pub enable_request_id: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth: AuthSettings::default(),
            rate_limit: RateLimitSettings::default(),
            enable_cors: true,
            enable_request_id: true,
            enable_tracing: true,
        }
    }
}

impl From<&MockConfig> for AppConfig {
    fn from(config: &MockConfig) -> Self {
        Self {
            auth: config.auth.clone(),
            rate_limit: config.rate_limit.clone(),
            enable_cors: config.http.enable_cors,
            enable_request_id: config.http.enable_request_id,
            enable_tracing: config.http.enable_tracing,
        }
    }
}

/// Jira Cloud REST v3 subset on port 4001
pub fn create_jira_app(context: JiraContext, config: &AppConfig) -> Router {
    let public = Router::new().route("/health", get(|| health_check(JIRA_SERVICE)));

    let protected = Router::new()
        .route("/rest/api/3/issue", post(handlers::jira::create_issue))
        .route(
            "/rest/api/3/issue/{key}",
            get(handlers::jira::get_issue)
                .put(handlers::jira::update_issue)
                .delete(handlers::jira::delete_issue),
        )
        .route(
            "/rest/api/3/issue/{key}/transitions",
            get(handlers::jira::get_transitions).post(handlers::jira::transition_issue),
        )
        .route(
            "/rest/api/3/issue/{key}/attachments",
            post(handlers::jira::add_attachments),
        )
        .route(
            "/rest/api/3/attachment/{id}",
            get(handlers::jira::get_attachment).delete(handlers::jira::delete_attachment),
        )
        .route(
            "/rest/api/3/search",
            get(handlers::jira::search_issues).post(handlers::jira::search_issues_post),
        )
        .route("/admin/reset", post(handlers::jira::reset))
        .route("/openapi.json", get(handlers::jira::openapi_document))
        .with_state(context);

    assemble::<JiraShape>(public, protected, config)
}

/// TestRail API v2 on port 4002, modern paths and `index.php` legacy dispatch
pub fn create_testrail_app(context: TestRailContext, config: &AppConfig) -> Router {
    let public = Router::new().route("/health", get(|| health_check(TESTRAIL_SERVICE)));

    let protected = Router::new()
        .route(
            "/index.php",
            get(handlers::testrail::legacy).post(handlers::testrail::legacy),
        )
        .route(
            "/api/v2/{*rest}",
            get(handlers::testrail::modern)
                .post(handlers::testrail::modern)
                .put(handlers::testrail::modern)
                .delete(handlers::testrail::modern),
        )
        .route("/admin/reset", post(handlers::testrail::reset))
        .route("/openapi.json", get(handlers::testrail::openapi_document))
        .with_state(context);

    assemble::<TestRailShape>(public, protected, config)
}

/// Slack Web API subset on port 4003
pub fn create_slack_app(context: SlackContext, config: &AppConfig) -> Router {
    let public = Router::new().route("/health", get(|| health_check(SLACK_SERVICE)));

    let protected = Router::new()
        .route("/api/chat.postMessage", post(handlers::slack::post_message))
        .route(
            "/api/conversations.history",
            get(handlers::slack::conversation_history),
        )
        .route(
            "/api/conversations.replies",
            get(handlers::slack::conversation_replies),
        )
        .route("/api/conversations.list", get(handlers::slack::list_conversations))
        .route("/api/conversations.info", get(handlers::slack::conversation_info))
        .route("/api/files.upload", post(handlers::slack::upload_file))
        .route("/api/files.info", get(handlers::slack::file_info))
        .route("/admin/reset", post(handlers::slack::reset))
        .route("/openapi.json", get(handlers::slack::openapi_document))
        .with_state(context);

    assemble::<SlackShape>(public, protected, config)
}

/// Guard the protected routes, merge, and add the outer middleware stack
fn assemble<S: ErrorShape>(public: Router, protected: Router, config: &AppConfig) -> Router {
    let mut protected = protected.route_layer(middleware::from_fn_with_state(
        BearerAuth::<S>::from(&config.auth),
        require_bearer::<S>,
    ));

    if config.rate_limit.enabled {
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        protected = protected.route_layer(middleware::from_fn_with_state(
            RateLimitState::<S>::new(limiter),
            rate_limit_middleware::<S>,
        ));
    }

    // Layers apply in reverse order
    let mut app = public.merge(protected).fallback(unknown_route::<S>);

    if config.enable_cors {
        app = app.layer(cors_layer());
    }

    if config.enable_request_id {
        app = app.layer(middleware::from_fn(request_id_middleware));
    }

    if config.enable_tracing {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.layer(middleware::from_fn(error_handler_middleware))
}

async fn unknown_route<S: ErrorShape>(uri: Uri) -> Response {
    S::respond(WebError::not_found(
        "route",
        format!("No endpoint matches {}", uri.path()),
    ))
}

