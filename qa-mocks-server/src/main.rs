//! QA mock services binary
//!
//! Runs the Jira, TestRail and Slack mocks, each on its own port.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use qa_mocks_config::{ConfigLoader, MockConfig};
use qa_mocks_server::{Server, ServiceSelection};

#[derive(Debug, Parser)]
#[command(name = "qa-mocks", author, version, about = "Jira, TestRail and Slack mock services", long_about = None)]
struct Cli {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Service to run
    #[arg(value_enum, default_value_t = ServiceSelection::All)]
    service: ServiceSelection,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Print default configuration if requested
    if cli.print_config {
        println!("{}", MockConfig::generate_sample());
        return Ok(());
    }

    // File values first, then environment overrides such as MOCK_AUTH_REQUIRED
    let config = ConfigLoader::new().load(cli.config.as_deref())?;

    let server = Server::new(config)?;
    server.start(cli.service).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_service_argument() {
        let cli = Cli::try_parse_from(["qa-mocks"]).unwrap();
        assert_eq!(cli.service, ServiceSelection::All);
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["qa-mocks", "--config", "mocks.yaml", "testrail"]).unwrap();
        assert_eq!(cli.service, ServiceSelection::Testrail);
        assert_eq!(cli.config, Some(PathBuf::from("mocks.yaml")));

        assert!(Cli::try_parse_from(["qa-mocks", "github"]).is_err());
    }
}
