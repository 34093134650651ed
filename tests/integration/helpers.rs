//! Helper functions for integration tests

use std::path::PathBuf;

use async_trait::async_trait;
use scorewatch::checkers::{CheckerSet, Outcome, ServiceChecker};
use scorewatch::config::PollerConfig;
use scorewatch::storage::{NewService, Service, ServiceKind, StorageBackend};

/// Poller config with short timeouts suitable for tests
pub fn test_poller_config(baseline_dir: PathBuf) -> PollerConfig {
    PollerConfig {
        interval_secs: 1,
        dns_timeout_secs: 1,
        http_timeout_secs: 2,
        ftp_timeout_secs: 1,
        baseline_dir,
    }
}

/// Insert a team plus one active service and return the service
pub async fn seed_service(
    backend: &dyn StorageBackend,
    kind: ServiceKind,
    connection: &str,
    request: &str,
    expected: &str,
) -> Service {
    let team = backend.insert_team("test team").await.unwrap();
    backend
        .insert_service(NewService {
            team_id: team.id,
            kind,
            name: format!("{kind} service"),
            connection: connection.to_string(),
            request: request.to_string(),
            expected: expected.to_string(),
            active: true,
        })
        .await
        .unwrap()
}

/// "host:port" connection string from a mock server URI
pub fn connection_for(uri: &str) -> String {
    let parsed = url::Url::parse(uri).unwrap();
    format!(
        "{}:{}",
        parsed.host_str().unwrap(),
        parsed.port().unwrap()
    )
}

/// A local port with nothing listening on it
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Checker returning a canned outcome, for driving the executor without any
/// network traffic
pub struct StaticChecker {
    outcome: Outcome,
}

impl StaticChecker {
    pub fn new(outcome: Outcome) -> Self {
        Self { outcome }
    }
}

#[async_trait]
impl ServiceChecker for StaticChecker {
    async fn check(&self, _service: &Service) -> Outcome {
        self.outcome.clone()
    }
}

/// Checker that panics, for failure-isolation tests
pub struct PanickingChecker;

#[async_trait]
impl ServiceChecker for PanickingChecker {
    async fn check(&self, _service: &Service) -> Outcome {
        panic!("checker blew up")
    }
}

/// A checker set answering every kind with the same canned outcome
pub fn static_set(outcome: Outcome) -> CheckerSet {
    CheckerSet::new(
        Box::new(StaticChecker::new(outcome.clone())),
        Box::new(StaticChecker::new(outcome.clone())),
        Box::new(StaticChecker::new(outcome.clone())),
        Box::new(StaticChecker::new(outcome)),
    )
}
