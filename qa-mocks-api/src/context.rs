//! Per-service handler state
//!
//! Each router gets one context: the service's repository, the seed lifecycle
//! used by `/admin/reset`, and the service's configuration.

use std::sync::Arc;

use qa_mocks_config::{JiraConfig, SlackConfig, TestRailConfig};
use qa_mocks_storage::jira::{JiraFixture, JiraRepository};
use qa_mocks_storage::slack::{SlackFixture, SlackRepository};
use qa_mocks_storage::testrail::{TestRailFixture, TestRailRepository};
use qa_mocks_storage::{SeedLifecycle, ServiceStore};

/// Context for the Jira endpoints
#[derive(Clone)]
pub struct JiraContext {
    pub issues: JiraRepository,
    pub seed: Arc<SeedLifecycle<JiraFixture>>,
    pub settings: Arc<JiraConfig>,
}

impl JiraContext {
    pub fn new(store: &ServiceStore<JiraFixture>, settings: JiraConfig) -> Self {
        Self {
            issues: JiraRepository::new(store.db.clone(), store.gate.clone()),
            seed: store.seed.clone(),
            settings: Arc::new(settings),
        }
    }

    /// `self` link for an issue
    pub fn issue_url(&self, id: i32) -> String {
        format!("{}/rest/api/3/issue/{}", self.settings.base_url, id)
    }

    pub fn attachment_url(&self, id: i32) -> String {
        format!("{}/rest/api/3/attachment/{}", self.settings.base_url, id)
    }
}

/// Context for the TestRail endpoints
#[derive(Clone)]
pub struct TestRailContext {
    pub store: TestRailRepository,
    pub seed: Arc<SeedLifecycle<TestRailFixture>>,
    pub settings: Arc<TestRailConfig>,
}

impl TestRailContext {
    pub fn new(store: &ServiceStore<TestRailFixture>, settings: TestRailConfig) -> Self {
        Self {
            store: TestRailRepository::new(store.db.clone(), store.gate.clone()),
            seed: store.seed.clone(),
            settings: Arc::new(settings),
        }
    }
}

/// Context for the Slack endpoints
#[derive(Clone)]
pub struct SlackContext {
    pub store: SlackRepository,
    pub seed: Arc<SeedLifecycle<SlackFixture>>,
    pub settings: Arc<SlackConfig>,
}

impl SlackContext {
    pub fn new(store: &ServiceStore<SlackFixture>, settings: SlackConfig) -> Self {
        Self {
            store: SlackRepository::new(store.db.clone(), store.gate.clone()),
            seed: store.seed.clone(),
            settings: Arc::new(settings),
        }
    }
}
