//! Configuration validation traits and helpers

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ConfigError, ConfigResult};

/// Jira-style project keys: an uppercase letter followed by uppercase letters or digits
static PROJECT_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]+$").expect("project key pattern compiles"));

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Validate an absolute http(s) URL
pub fn validate_url(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    validate_required_string(value, field_name, domain)?;

    let parsed = url::Url::parse(value).map_err(|e| ConfigError::DomainError {
        domain: domain.to_string(),
        message: format!("{} has invalid URL format: {}", field_name, e),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must use http or https, got '{}'", field_name, scheme),
        }),
    }
}

/// Validate that a port is usable for listening
pub fn validate_port(port: u16, field_name: &str, domain: &str) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be a fixed port, got 0", field_name),
        });
    }
    Ok(())
}

/// Validate a SQLite connection string
pub fn validate_sqlite_url(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    validate_required_string(value, field_name, domain)?;

    if !value.starts_with("sqlite:") {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be a sqlite: URL, got '{}'", field_name, value),
        });
    }
    Ok(())
}

/// Whether `value` is a project key such as `QA` or `OPS2`
pub fn is_project_key(value: &str) -> bool {
    PROJECT_KEY.is_match(value)
}

/// Validate a Jira-style project key such as `QA` or `OPS2`
pub fn validate_project_key(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if !is_project_key(value) {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!(
                "{} must be uppercase letters and digits starting with a letter, got '{}'",
                field_name, value
            ),
        });
    }
    Ok(())
}
