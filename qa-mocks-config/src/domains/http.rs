//! HTTP listener, authentication and rate limiting settings shared by all services

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Listener and middleware toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Address every service binds to
    pub bind_address: String,

    /// Enable permissive CORS
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_cors: bool,

    /// Enable `X-Request-ID` propagation
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_request_id: bool,

    /// Enable per-request tracing spans
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_tracing: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            enable_cors: true,
            enable_request_id: true,
            enable_tracing: true,
        }
    }
}

impl Validatable for HttpSettings {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.bind_address, "bind_address", self.domain_name())?;
        if self.bind_address.parse::<std::net::IpAddr>().is_err() {
            return Err(self.validation_error(format!(
                "bind_address must be an IP address, got '{}'",
                self.bind_address
            )));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}

/// Bearer-presence authentication toggle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Require `Authorization: Bearer <token>` on protected routes
    pub required: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self { required: true }
    }
}

impl Validatable for AuthSettings {
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "auth"
    }
}

/// Token bucket rate limiting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub enabled: bool,
    /// Sustained refill rate per client
    pub requests_per_minute: u32,
    /// Bucket capacity per client
    pub burst_size: u32,
    /// Maximum number of clients tracked at once
    pub max_clients: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_minute: 600,
            burst_size: 100,
            max_clients: 10_000,
        }
    }
}

impl Validatable for RateLimitSettings {
    fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }
        validate_positive(self.requests_per_minute, "requests_per_minute", self.domain_name())?;
        validate_positive(self.burst_size, "burst_size", self.domain_name())?;
        validate_positive(self.max_clients, "max_clients", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "rate_limit"
    }
}
