//! Server startup and shutdown logic

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use qa_mocks_api::{
    create_jira_app, create_slack_app, create_testrail_app, AppConfig, JiraContext, SlackContext,
    TestRailContext,
};
use qa_mocks_config::MockConfig;
use qa_mocks_storage::{jira, slack, testrail, ServiceStore};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info};

/// One of the mocked vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Jira,
    TestRail,
    Slack,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Jira, Service::TestRail, Service::Slack];

    pub fn name(self) -> &'static str {
        match self {
            Service::Jira => "jira",
            Service::TestRail => "testrail",
            Service::Slack => "slack",
        }
    }

    pub fn port(self, config: &MockConfig) -> u16 {
        match self {
            Service::Jira => config.jira.port,
            Service::TestRail => config.testrail.port,
            Service::Slack => config.slack.port,
        }
    }
}

/// Which services a process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ServiceSelection {
    Jira,
    Testrail,
    Slack,
    #[default]
    All,
}

impl ServiceSelection {
    pub fn services(self) -> Vec<Service> {
        match self {
            ServiceSelection::Jira => vec![Service::Jira],
            ServiceSelection::Testrail => vec![Service::TestRail],
            ServiceSelection::Slack => vec![Service::Slack],
            ServiceSelection::All => Service::ALL.to_vec(),
        }
    }
}

/// Server application struct
pub struct Server {
    config: MockConfig,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: MockConfig) -> Result<Self> {
        // Initialize logging first
        qa_mocks_logging::init_logging(&config.logging)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Open the service's store, seeding it on first use, and build its router
    pub async fn build_app(&self, service: Service) -> Result<Router> {
        let app_config = AppConfig::from(&self.config);

        let app = match service {
            Service::Jira => {
                let store = ServiceStore::open::<jira::Migrator>(self.config.jira.database.clone(), jira::JiraFixture)
                    .await
                    .context("Failed to open the Jira store")?;
                create_jira_app(JiraContext::new(&store, self.config.jira.clone()), &app_config)
            }
            Service::TestRail => {
                let store = ServiceStore::open::<testrail::Migrator>(
                    self.config.testrail.database.clone(),
                    testrail::TestRailFixture,
                )
                .await
                .context("Failed to open the TestRail store")?;
                create_testrail_app(TestRailContext::new(&store, self.config.testrail.clone()), &app_config)
            }
            Service::Slack => {
                let store =
                    ServiceStore::open::<slack::Migrator>(self.config.slack.database.clone(), slack::SlackFixture)
                        .await
                        .context("Failed to open the Slack store")?;
                create_slack_app(SlackContext::new(&store, self.config.slack.clone()), &app_config)
            }
        };

        Ok(app)
    }

    /// Serve the selected services until Ctrl-C or SIGTERM
    ///
    /// Every listener is bound before any request is served, so a port clash
    /// fails startup as a whole. A service that stops on its own takes the
    /// others down with it.
    pub async fn start(self, selection: ServiceSelection) -> Result<()> {
        self.log_config_summary(selection);

        let mut bound = Vec::new();
        for service in selection.services() {
            let app = self.build_app(service).await?;
            let addr = self.config.listen_address(service.port(&self.config));
            let listener = TcpListener::bind(addr.as_str())
                .await
                .with_context(|| format!("Failed to bind the {} mock to {}", service.name(), addr))?;
            info!(service = service.name(), %addr, "Mock service listening");
            bound.push((service, listener, app));
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut servers = JoinSet::new();
        for (service, listener, app) in bound {
            let mut stop = stop_rx.clone();
            servers.spawn(async move {
                axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                    .with_graceful_shutdown(async move {
                        // A dropped sender also means stop
                        let _ = stop.wait_for(|stopping| *stopping).await;
                    })
                    .await
                    .with_context(|| format!("The {} mock failed", service.name()))?;
                Ok::<_, anyhow::Error>(service)
            });
        }

        let mut failure = None;
        tokio::select! {
            () = shutdown_signal() => {}
            Some(joined) = servers.join_next() => failure = finished(joined).err(),
        }

        let _ = stop_tx.send(true);
        while let Some(joined) = servers.join_next().await {
            if let Err(e) = finished(joined) {
                failure.get_or_insert(e);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => {
                info!("Server shutdown complete");
                Ok(())
            }
        }
    }

    /// Log configuration summary
    fn log_config_summary(&self, selection: ServiceSelection) {
        info!("=== QA Mock Services ===");
        for service in selection.services() {
            info!(
                "{}: http://{}",
                service.name(),
                self.config.listen_address(service.port(&self.config))
            );
        }
        info!(
            "Auth: {}",
            if self.config.auth.required { "bearer token required" } else { "disabled" }
        );
        info!(
            "Rate limit: {}",
            if self.config.rate_limit.enabled { "Enabled" } else { "Disabled" }
        );
        info!("CORS: {}", if self.config.http.enable_cors { "Enabled" } else { "Disabled" });
        info!("========================");
    }
}

fn finished(joined: Result<Result<Service>, JoinError>) -> Result<()> {
    let service = joined.context("A mock service task panicked")??;
    info!(service = service.name(), "Mock service stopped");
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use qa_mocks_config::DatabaseSettings;
    use serde_json::{json, Value};

    fn memory_config() -> MockConfig {
        let mut config = MockConfig::default();
        config.jira.database = DatabaseSettings::sqlite("sqlite::memory:");
        config.testrail.database = DatabaseSettings::sqlite("sqlite::memory:");
        config.slack.database = DatabaseSettings::sqlite("sqlite::memory:");
        config
    }

    #[test]
    fn test_selection() {
        assert_eq!(ServiceSelection::default(), ServiceSelection::All);
        assert_eq!(ServiceSelection::All.services().len(), 3);
        assert_eq!(ServiceSelection::Testrail.services(), vec![Service::TestRail]);

        let config = MockConfig::default();
        let ports: Vec<u16> = Service::ALL.iter().map(|s| s.port(&config)).collect();
        assert_eq!(ports, vec![4001, 4002, 4003]);
    }

    #[tokio::test]
    async fn test_every_service_builds() {
        let server = Server::new(memory_config()).unwrap();

        for service in Service::ALL {
            let app = server.build_app(service).await.unwrap();
            let client = TestServer::new(app).unwrap();
            let health: Value = client.get("/health").await.json();
            assert_eq!(health["status"], "healthy");
            assert_eq!(health["service"], format!("{}-mock", service.name()));
        }
    }

    #[tokio::test]
    async fn test_issue_counter_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = memory_config();
        config.jira.database = DatabaseSettings::sqlite(format!("sqlite://{}", dir.path().join("jira.db").display()));
        let server = Server::new(config).unwrap();

        let issue = json!({
            "fields": {
                "project": {"key": "QA"},
                "summary": "Survives restart",
                "issuetype": {"name": "Task"}
            }
        });

        let first = TestServer::new(server.build_app(Service::Jira).await.unwrap()).unwrap();
        let created: Value = first
            .post("/rest/api/3/issue")
            .authorization_bearer("token")
            .json(&issue)
            .await
            .json();
        assert_eq!(created["key"], "QA-4");
        let deleted = first
            .delete("/rest/api/3/issue/QA-4")
            .authorization_bearer("token")
            .await;
        assert!(deleted.status_code().is_success());
        drop(first);

        let second = TestServer::new(server.build_app(Service::Jira).await.unwrap()).unwrap();
        let created: Value = second
            .post("/rest/api/3/issue")
            .authorization_bearer("token")
            .json(&issue)
            .await
            .json();
        assert_eq!(created["key"], "QA-5");
    }
}
