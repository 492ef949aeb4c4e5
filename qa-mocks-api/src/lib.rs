//! # QA Mocks API
//!
//! Routers for the three mock services. Each speaks its vendor's dialect:
//!
//! - **Jira** (port 4001): issues, transitions, attachments and JQL search under
//!   `/rest/api/3`, errors as `{"errorMessages", "errors"}`
//! - **TestRail** (port 4002): API v2 through clean `/api/v2/...` paths and the
//!   legacy `index.php?/api/v2/<method>/<id>` form, both served by one dispatcher
//! - **Slack** (port 4003): `chat.postMessage`, `conversations.*` and `files.*`
//!   with the `{"ok": ...}` envelope
//!
//! Every route except `/health` requires a bearer token unless authentication
//! is switched off in the configuration.
//!
//! ## Example
//!
//! ```rust,no_run
//! use qa_mocks_api::{create_jira_app, AppConfig, JiraContext};
//! use qa_mocks_config::JiraConfig;
//! use qa_mocks_storage::jira::{JiraFixture, Migrator};
//! use qa_mocks_storage::ServiceStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ServiceStore::in_memory::<Migrator>(JiraFixture).await?;
//! let app = create_jira_app(JiraContext::new(&store, JiraConfig::default()), &AppConfig::default());
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:4001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod context;
pub mod dispatch;
pub mod errors;
pub mod handlers;
pub mod jql;
pub mod models;

// Re-export commonly used types
pub use app::{create_jira_app, create_slack_app, create_testrail_app, AppConfig};
pub use context::{JiraContext, SlackContext, TestRailContext};
pub use errors::{ApiError, JiraShape, SlackShape, TestRailShape};
