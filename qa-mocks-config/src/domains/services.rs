//! Per-service configuration for the Jira, TestRail and Slack mocks

use crate::error::ConfigResult;
use crate::validation::{
    validate_port, validate_positive, validate_project_key, validate_required_string,
    validate_sqlite_url, validate_url, Validatable,
};
use serde::{Deserialize, Serialize};

/// Embedded store settings for one service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite connection string
    pub url: String,

    /// Maximum pooled connections
    pub max_connections: u32,

    /// Connection and acquire timeout in seconds
    pub connection_timeout_secs: u64,
}

impl DatabaseSettings {
    pub fn sqlite(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            connection_timeout_secs: 30,
        }
    }
}

impl Validatable for DatabaseSettings {
    fn validate(&self) -> ConfigResult<()> {
        validate_sqlite_url(&self.url, "url", self.domain_name())?;
        validate_positive(self.max_connections, "max_connections", self.domain_name())?;
        validate_positive(
            self.connection_timeout_secs,
            "connection_timeout_secs",
            self.domain_name(),
        )?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "database"
    }
}

/// Jira mock configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    pub port: u16,
    pub database: DatabaseSettings,
    /// Project used when an issue is created without `fields.project`
    pub default_project: String,
    /// Prefix for the `self` links in issue payloads
    pub base_url: String,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            port: 4001,
            database: DatabaseSettings::sqlite("sqlite://data/jira.db"),
            default_project: "QA".to_string(),
            base_url: "http://localhost:4001".to_string(),
        }
    }
}

impl Validatable for JiraConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_port(self.port, "port", self.domain_name())?;
        self.database.validate()?;
        validate_project_key(&self.default_project, "default_project", self.domain_name())?;
        validate_url(&self.base_url, "base_url", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "jira"
    }
}

/// TestRail mock configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRailConfig {
    pub port: u16,
    pub database: DatabaseSettings,
    /// Project used by legacy calls that omit a project id
    pub default_project_id: i32,
}

impl Default for TestRailConfig {
    fn default() -> Self {
        Self {
            port: 4002,
            database: DatabaseSettings::sqlite("sqlite://data/testrail.db"),
            default_project_id: 1,
        }
    }
}

impl Validatable for TestRailConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_port(self.port, "port", self.domain_name())?;
        self.database.validate()?;
        validate_positive(self.default_project_id, "default_project_id", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "testrail"
    }
}

/// Slack mock configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub port: u16,
    pub database: DatabaseSettings,
    /// Channel used by uploads that name no channel
    pub default_channel: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            port: 4003,
            database: DatabaseSettings::sqlite("sqlite://data/slack.db"),
            default_channel: "qa-reports".to_string(),
        }
    }
}

impl Validatable for SlackConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_port(self.port, "port", self.domain_name())?;
        self.database.validate()?;
        validate_required_string(&self.default_channel, "default_channel", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "slack"
    }
}
