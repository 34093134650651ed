//! Poll cycle executor
//!
//! One cycle: list the active services, dispatch each to its checker, and
//! record exactly one poll result per service - score 1 on a match, score 0
//! plus an error record otherwise.
//!
//! ## Failure isolation
//!
//! Completion is independent per service. Every check runs in its own
//! spawned task, so a panicking checker is contained by the task boundary
//! and scored as a failure; a hung checker is cut off by a guard timeout
//! slightly above the slowest checker's own bound. Storage write failures
//! are logged and do not abort the remainder of the cycle.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use crate::checkers::{CheckerSet, Outcome};
use crate::config::PollerConfig;
use crate::storage::{Service, StorageBackend};

/// Headroom on top of the slowest checker timeout before the executor
/// abandons a check task
const GUARD_GRACE: Duration = Duration::from_secs(5);

/// What one completed cycle did, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub polled: usize,
    pub passed: usize,
    pub failed: usize,
}

pub struct CycleExecutor {
    storage: Arc<dyn StorageBackend>,
    checkers: Arc<CheckerSet>,
    guard_timeout: Duration,
}

impl CycleExecutor {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        checkers: CheckerSet,
        config: &PollerConfig,
    ) -> Self {
        let slowest = config
            .dns_timeout()
            .max(config.http_timeout())
            .max(config.ftp_timeout());

        Self {
            storage,
            checkers: Arc::new(checkers),
            guard_timeout: slowest + GUARD_GRACE,
        }
    }

    /// Poll every active service once and persist the outcomes
    ///
    /// Returns an error only when the service listing itself fails; all
    /// per-service failures are absorbed into score-0 results.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> anyhow::Result<CycleSummary> {
        let services = self.storage.list_active_services().await?;
        debug!("polling {} active services", services.len());

        let checks = services.into_iter().map(|service| self.run_check(service));
        let results = join_all(checks).await;

        let mut summary = CycleSummary {
            polled: results.len(),
            passed: 0,
            failed: 0,
        };

        for (service, outcome) in &results {
            let score = if outcome.matched {
                summary.passed += 1;
                1
            } else {
                summary.failed += 1;
                0
            };

            if !outcome.matched {
                if let Some(diagnostic) = &outcome.diagnostic {
                    if let Err(e) = self.storage.insert_error(service.id, diagnostic).await {
                        error!("failed to record error for {}: {e}", service.name);
                    }
                }
            }

            if let Err(e) = self.storage.insert_poll_result(service.id, score).await {
                error!("failed to record poll result for {}: {e}", service.name);
            }
        }

        info!(
            "cycle complete: {} polled, {} passed, {} failed",
            summary.polled, summary.passed, summary.failed
        );
        Ok(summary)
    }

    /// Run one check in its own task, converting panics and guard-timeout
    /// expiry into failed outcomes
    async fn run_check(&self, service: Service) -> (Service, Outcome) {
        let checkers = Arc::clone(&self.checkers);
        let mut probe = {
            let service = service.clone();
            tokio::spawn(async move { checkers.dispatch(service.kind).check(&service).await })
        };

        let outcome = match tokio::time::timeout(self.guard_timeout, &mut probe).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => {
                error!("checker task for {} died: {join_err}", service.name);
                Outcome::fail(format!(
                    "Checker for service {} aborted unexpectedly",
                    service.name
                ))
            }
            Err(_) => {
                warn!(
                    "checker for {} exceeded the {}s guard timeout",
                    service.name,
                    self.guard_timeout.as_secs()
                );
                probe.abort();
                Outcome::fail(format!(
                    "Check for service {} exceeded the {} second guard timeout",
                    service.name,
                    self.guard_timeout.as_secs()
                ))
            }
        };

        (service, outcome)
    }
}
