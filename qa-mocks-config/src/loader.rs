//! Configuration loading and environment variable handling

use crate::domains::http::{AuthSettings, HttpSettings, RateLimitSettings};
use crate::domains::logging::{LogFormat, LogLevel, LoggingConfig};
use crate::domains::services::{JiraConfig, SlackConfig, TestRailConfig};
use crate::domains::utils::parse_bool;
use crate::domains::MockConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix, empty for bare names such as `MOCK_AUTH_REQUIRED`
    prefix: String,
}

impl ConfigLoader {
    /// Create a loader reading unprefixed variables
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
        }
    }

    /// Create a loader reading `{prefix}_{NAME}` variables
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML or JSON file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<MockConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let mut config: MockConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<MockConfig> {
        let mut config = MockConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<MockConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut MockConfig) -> ConfigResult<()> {
        self.apply_logging_overrides(&mut config.logging)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_auth_overrides(&mut config.auth)?;
        self.apply_rate_limit_overrides(&mut config.rate_limit)?;
        self.apply_jira_overrides(&mut config.jira)?;
        self.apply_testrail_overrides(&mut config.testrail)?;
        self.apply_slack_overrides(&mut config.slack)?;
        Ok(())
    }

    fn apply_logging_overrides(&self, config: &mut LoggingConfig) -> ConfigResult<()> {
        if let Some(level) = self.get_env_var("LOG_LEVEL") {
            config.level = LogLevel::from_str(&level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", level)))?;
        }

        if let Some(format) = self.get_env_var("LOG_FORMAT") {
            config.format = LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    fn apply_http_overrides(&self, config: &mut HttpSettings) -> ConfigResult<()> {
        if let Some(bind) = self.get_env_var("BIND_ADDRESS") {
            config.bind_address = bind;
        }
        Ok(())
    }

    fn apply_auth_overrides(&self, config: &mut AuthSettings) -> ConfigResult<()> {
        if let Some(required) = self.get_bool("MOCK_AUTH_REQUIRED")? {
            config.required = required;
        }
        Ok(())
    }

    fn apply_rate_limit_overrides(&self, config: &mut RateLimitSettings) -> ConfigResult<()> {
        if let Some(enabled) = self.get_bool("ENABLE_RATE_LIMIT")? {
            config.enabled = enabled;
        }

        if let Some(per_minute) = self.get_parsed::<u32>("RATE_LIMIT_PER_MINUTE")? {
            config.requests_per_minute = per_minute;
        }

        if let Some(burst) = self.get_parsed::<u32>("RATE_LIMIT_BURST")? {
            config.burst_size = burst;
        }

        Ok(())
    }

    fn apply_jira_overrides(&self, config: &mut JiraConfig) -> ConfigResult<()> {
        if let Some(port) = self.get_parsed::<u16>("JIRA_PORT")? {
            config.port = port;
        }
        if let Some(url) = self.get_env_var("JIRA_DATABASE_URL") {
            config.database.url = url;
        }
        if let Some(project) = self.get_env_var("JIRA_DEFAULT_PROJECT") {
            config.default_project = project.to_uppercase();
        }
        if let Some(base_url) = self.get_env_var("JIRA_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        Ok(())
    }

    fn apply_testrail_overrides(&self, config: &mut TestRailConfig) -> ConfigResult<()> {
        if let Some(port) = self.get_parsed::<u16>("TESTRAIL_PORT")? {
            config.port = port;
        }
        if let Some(url) = self.get_env_var("TESTRAIL_DATABASE_URL") {
            config.database.url = url;
        }
        if let Some(project_id) = self.get_parsed::<i32>("TESTRAIL_DEFAULT_PROJECT_ID")? {
            config.default_project_id = project_id;
        }
        Ok(())
    }

    fn apply_slack_overrides(&self, config: &mut SlackConfig) -> ConfigResult<()> {
        if let Some(port) = self.get_parsed::<u16>("SLACK_PORT")? {
            config.port = port;
        }
        if let Some(url) = self.get_env_var("SLACK_DATABASE_URL") {
            config.database.url = url;
        }
        if let Some(channel) = self.get_env_var("SLACK_DEFAULT_CHANNEL") {
            config.default_channel = channel.trim_start_matches('#').to_string();
        }
        Ok(())
    }

    fn get_bool(&self, name: &str) -> ConfigResult<Option<bool>> {
        match self.get_env_var(name) {
            Some(raw) => parse_bool(&raw)
                .map(Some)
                .ok_or_else(|| ConfigError::EnvError(format!("Invalid {}: {}", name, raw))),
            None => Ok(None),
        }
    }

    fn get_parsed<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e))),
            None => Ok(None),
        }
    }

    /// Get environment variable with prefix; empty values count as unset
    fn get_env_var(&self, name: &str) -> Option<String> {
        let key = if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.prefix, name)
        };
        std::env::var(key).ok().filter(|value| !value.is_empty())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
