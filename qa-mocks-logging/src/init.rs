use anyhow::Result;
use qa_mocks_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Noisy dependencies are capped unless `RUST_LOG` says otherwise
const DEPENDENCY_DIRECTIVES: &str = "sqlx=warn,sea_orm=warn,sea_orm_migration=warn,hyper=info";

/// Initialize logging from configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_filter(config.level.as_str());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    // Use try_init to avoid panic if global subscriber already set
    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// Initialize simple tracing for basic console output
pub fn init_simple_tracing(log_level: &str) -> Result<()> {
    if tracing_subscriber::fmt()
        .with_env_filter(build_filter(log_level))
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},{}", level, DEPENDENCY_DIRECTIVES)))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_mocks_config::LogLevel;

    #[test]
    fn test_repeated_initialization_is_harmless() {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Compact,
            include_location: true,
        };

        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
        assert!(init_simple_tracing("warn").is_ok());
    }

    #[test]
    fn test_filter_accepts_configured_level() {
        let filter = build_filter("trace");
        assert!(!filter.to_string().is_empty());
    }
}
