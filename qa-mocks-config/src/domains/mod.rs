//! Domain-specific configuration modules

pub mod http;
pub mod logging;
pub mod services;
pub mod utils;

use crate::error::{ConfigError, ConfigResult};
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MockConfig {
    /// Logging configuration
    pub logging: logging::LoggingConfig,

    /// Listener and middleware toggles shared by every service
    pub http: http::HttpSettings,

    /// Bearer-presence check
    pub auth: http::AuthSettings,

    /// Optional per-client rate limiting
    pub rate_limit: http::RateLimitSettings,

    /// Jira mock
    pub jira: services::JiraConfig,

    /// TestRail mock
    pub testrail: services::TestRailConfig,

    /// Slack mock
    pub slack: services::SlackConfig,
}

impl MockConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.logging.validate()?;
        self.http.validate()?;
        self.auth.validate()?;
        self.rate_limit.validate()?;
        self.jira.validate()?;
        self.testrail.validate()?;
        self.slack.validate()?;

        let ports = [
            ("jira", self.jira.port),
            ("testrail", self.testrail.port),
            ("slack", self.slack.port),
        ];
        for (i, (name, port)) in ports.iter().enumerate() {
            if let Some((other, _)) = ports[i + 1..].iter().find(|(_, p)| p == port) {
                return Err(ConfigError::DomainError {
                    domain: "services".to_string(),
                    message: format!("{} and {} both listen on port {}", name, other, port),
                });
            }
        }

        Ok(())
    }

    /// Socket address string for a service port
    pub fn listen_address(&self, port: u16) -> String {
        format!("{}:{}", self.http.bind_address, port)
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        serde_yaml::to_string(&MockConfig::default())
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MockConfig::default().validate_all().is_ok());
    }

    #[test]
    fn test_duplicate_ports_rejected() {
        let mut config = MockConfig::default();
        config.slack.port = config.jira.port;
        let err = config.validate_all().unwrap_err();
        assert!(err.to_string().contains("port 4001"));
    }

    #[test]
    fn test_listen_address() {
        let config = MockConfig::default();
        assert_eq!(config.listen_address(4002), "0.0.0.0:4002");
    }
}
