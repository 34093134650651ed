//! Scheduler availability tests
//!
//! The poll loop must run indefinitely: cycles that fail, and cycles that
//! panic outright, must not stop the next cycle from starting on schedule.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use scorewatch::checkers::Outcome;
use scorewatch::executor::CycleExecutor;
use scorewatch::scheduler::PollScheduler;
use scorewatch::storage::{
    ErrorRow, HealthStatus, MemoryBackend, NewService, PollRow, Service, ServiceKind,
    StorageBackend, StorageError, StorageResult, Team,
};

use crate::helpers::*;

/// How a broken storage breaks its service listing
enum ListingFailure {
    Error,
    Panic,
}

/// Storage whose service listing always blows up, counting attempts
struct BrokenStorage {
    mode: ListingFailure,
    listings: Arc<AtomicUsize>,
}

#[async_trait]
impl StorageBackend for BrokenStorage {
    async fn list_active_services(&self) -> StorageResult<Vec<Service>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            ListingFailure::Error => {
                Err(StorageError::QueryFailed("database on fire".to_string()))
            }
            ListingFailure::Panic => panic!("storage exploded"),
        }
    }

    async fn insert_poll_result(&self, _service_id: i64, _score: u8) -> StorageResult<()> {
        Ok(())
    }

    async fn insert_error(&self, _service_id: i64, _message: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn insert_team(&self, name: &str) -> StorageResult<Team> {
        Ok(Team {
            id: 0,
            name: name.to_string(),
        })
    }

    async fn insert_service(&self, _service: NewService) -> StorageResult<Service> {
        Err(StorageError::BackendError("not supported".to_string()))
    }

    async fn list_teams(&self) -> StorageResult<Vec<Team>> {
        Ok(Vec::new())
    }

    async fn recent_poll_results(
        &self,
        _service_id: i64,
        _limit: usize,
    ) -> StorageResult<Vec<PollRow>> {
        Ok(Vec::new())
    }

    async fn recent_errors(&self, _service_id: i64, _limit: usize) -> StorageResult<Vec<ErrorRow>> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        Ok(HealthStatus {
            healthy: false,
            message: "broken on purpose".to_string(),
        })
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}

async fn run_scheduler_against(mode: ListingFailure) -> usize {
    let listings = Arc::new(AtomicUsize::new(0));
    let storage = Arc::new(BrokenStorage {
        mode,
        listings: listings.clone(),
    });

    let config = test_poller_config(std::env::temp_dir());
    let executor = CycleExecutor::new(storage, static_set(Outcome::pass("ok")), &config);
    let scheduler = PollScheduler::new(executor, Duration::from_millis(50));

    let handle = tokio::spawn(scheduler.run());
    tokio::time::sleep(Duration::from_millis(400)).await;
    handle.abort();

    listings.load(Ordering::SeqCst)
}

#[tokio::test]
async fn test_scheduler_survives_failing_cycles() {
    let listings = run_scheduler_against(ListingFailure::Error).await;
    assert!(
        listings >= 2,
        "scheduler must keep starting cycles after failures, saw {listings}"
    );
}

#[tokio::test]
async fn test_scheduler_survives_panicking_cycles() {
    let listings = run_scheduler_against(ListingFailure::Panic).await;
    assert!(
        listings >= 2,
        "scheduler must keep starting cycles after panics, saw {listings}"
    );
}

#[tokio::test]
async fn test_scheduler_polls_healthy_services_repeatedly() {
    let backend = Arc::new(MemoryBackend::new());
    let team = backend.insert_team("blue").await.unwrap();
    let service = backend
        .insert_service(NewService {
            team_id: team.id,
            kind: ServiceKind::Http,
            name: "web".to_string(),
            connection: "127.0.0.1".to_string(),
            request: "/".to_string(),
            expected: "index.baseline".to_string(),
            active: true,
        })
        .await
        .unwrap();

    let config = test_poller_config(std::env::temp_dir());
    let executor = CycleExecutor::new(backend.clone(), static_set(Outcome::pass("ok")), &config);
    let scheduler = PollScheduler::new(executor, Duration::from_millis(50));

    let handle = tokio::spawn(scheduler.run());
    tokio::time::sleep(Duration::from_millis(400)).await;
    handle.abort();

    let polls = backend.recent_poll_results(service.id, 100).await.unwrap();
    assert!(
        polls.len() >= 2,
        "expected repeated cycles, saw {} poll rows",
        polls.len()
    );
    assert!(polls.iter().all(|p| p.score == 1));
}
