//! Domain-driven configuration for the QA mock services
//!
//! Configuration is split by concern (logging, http, auth, rate limiting and one
//! domain per mocked vendor), loaded from an optional YAML/JSON file and then
//! overridden from environment variables such as `MOCK_AUTH_REQUIRED`.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    http::{AuthSettings, HttpSettings, RateLimitSettings},
    logging::{LogFormat, LogLevel, LoggingConfig},
    services::{DatabaseSettings, JiraConfig, SlackConfig, TestRailConfig},
    MockConfig,
};
