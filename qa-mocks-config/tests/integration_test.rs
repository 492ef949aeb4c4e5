//! Integration tests for qa-mocks-config

use qa_mocks_config::*;
use std::io::Write;
use temp_env::with_vars;

const ALL_VARS: [&str; 8] = [
    "MOCK_AUTH_REQUIRED",
    "ENABLE_RATE_LIMIT",
    "LOG_LEVEL",
    "JIRA_PORT",
    "JIRA_DEFAULT_PROJECT",
    "TESTRAIL_DEFAULT_PROJECT_ID",
    "SLACK_DEFAULT_CHANNEL",
    "SLACK_DATABASE_URL",
];

fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
    ALL_VARS.iter().map(|name| (*name, None)).collect()
}

#[test]
fn test_config_loader_defaults() {
    with_vars(cleared(), || {
        let config = ConfigLoader::new().from_env().unwrap();

        assert!(config.auth.required);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.jira.port, 4001);
        assert_eq!(config.testrail.port, 4002);
        assert_eq!(config.slack.port, 4003);
        assert_eq!(config.jira.default_project, "QA");
        assert_eq!(config.slack.default_channel, "qa-reports");
    });
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("MOCK_AUTH_REQUIRED", Some("false")),
        ("ENABLE_RATE_LIMIT", Some("1")),
        ("LOG_LEVEL", Some("debug")),
        ("JIRA_PORT", Some("5001")),
        ("JIRA_DEFAULT_PROJECT", Some("ops")),
        ("TESTRAIL_DEFAULT_PROJECT_ID", Some("7")),
        ("SLACK_DEFAULT_CHANNEL", Some("#general")),
        ("SLACK_DATABASE_URL", Some("sqlite::memory:")),
    ];

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();

        assert!(!config.auth.required);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.jira.port, 5001);
        assert_eq!(config.jira.default_project, "OPS");
        assert_eq!(config.testrail.default_project_id, 7);
        assert_eq!(config.slack.default_channel, "general");
        assert_eq!(config.slack.database.url, "sqlite::memory:");
    });
}

#[test]
fn test_prefixed_loader() {
    let vars = vec![
        ("QA_MOCK_AUTH_REQUIRED", Some("no")),
        ("MOCK_AUTH_REQUIRED", Some("yes")),
    ];

    with_vars(vars, || {
        let config = ConfigLoader::with_prefix("QA").from_env().unwrap();
        assert!(!config.auth.required);
    });
}

#[test]
fn test_invalid_env_values_fail() {
    with_vars(vec![("MOCK_AUTH_REQUIRED", Some("sometimes"))], || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert!(matches!(err, ConfigError::EnvError(_)));
    });

    with_vars(vec![("JIRA_PORT", Some("seventy"))], || {
        assert!(ConfigLoader::new().from_env().is_err());
    });

    with_vars(vec![("JIRA_PORT", Some("4003"))], || {
        let err = ConfigLoader::new().from_env().unwrap_err();
        assert!(matches!(err, ConfigError::DomainError { .. }));
    });
}

#[test]
fn test_yaml_file_with_env_override() {
    let yaml = r#"
logging:
  level: warn
  format: json
auth:
  required: true
rate_limit:
  enabled: true
  requests_per_minute: 60
  burst_size: 10
jira:
  port: 5101
  default_project: DEMO
  database:
    url: "sqlite:///tmp/jira-test.db"
testrail:
  default_project_id: 3
"#;

    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let mut vars = cleared();
    vars.retain(|(name, _)| *name != "MOCK_AUTH_REQUIRED");
    vars.push(("MOCK_AUTH_REQUIRED", Some("false")));

    with_vars(vars, || {
        let config = ConfigLoader::new().load(Some(file.path())).unwrap();

        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.auth.required);
        assert_eq!(config.rate_limit.requests_per_minute, 60);
        assert_eq!(config.jira.port, 5101);
        assert_eq!(config.jira.default_project, "DEMO");
        assert_eq!(config.jira.database.url, "sqlite:///tmp/jira-test.db");
        assert_eq!(config.jira.database.max_connections, 5);
        assert_eq!(config.testrail.default_project_id, 3);
        assert_eq!(config.testrail.port, 4002);
    });
}

#[test]
fn test_json_file_and_sample_round_trip() {
    let sample = MockConfig::generate_sample();
    let parsed: MockConfig = serde_yaml::from_str(&sample).unwrap();
    assert!(parsed.validate_all().is_ok());

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(br#"{"slack": {"port": 4999}}"#).unwrap();

    with_vars(cleared(), || {
        let config = ConfigLoader::new().from_file(file.path()).unwrap();
        assert_eq!(config.slack.port, 4999);
        assert_eq!(config.jira.port, 4001);
    });
}

#[test]
fn test_missing_file_is_an_error() {
    let result = ConfigLoader::new().from_file("/definitely/not/here.yaml");
    assert!(matches!(result, Err(ConfigError::FileReadError(_))));
}
