//! In-memory storage backend (no persistence)
//!
//! This backend keeps all rows in plain vectors behind a mutex. It's useful
//! for:
//! - Testing poll cycles without database dependencies
//! - Running the poller with `storage.backend = "none"`
//!
//! ## Limitations
//!
//! - **No persistence**: All data lost on restart
//! - **Unbounded**: Poll history grows until the process exits

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::backend::{HealthStatus, StorageBackend};
use super::error::{StorageError, StorageResult};
use super::schema::{ErrorRow, NewService, PollRow, Service, Team};

#[derive(Default)]
struct Tables {
    teams: Vec<Team>,
    services: Vec<Service>,
    polls: Vec<PollRow>,
    errors: Vec<ErrorRow>,
}

/// In-memory storage backend
///
/// All mutation goes through one mutex; each operation is a single short
/// critical section, never held across an await point.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StorageError::BackendError("memory backend mutex poisoned".to_string()))
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn list_active_services(&self) -> StorageResult<Vec<Service>> {
        let tables = self.lock()?;
        Ok(tables
            .services
            .iter()
            .filter(|s| s.active)
            .cloned()
            .collect())
    }

    async fn insert_poll_result(&self, service_id: i64, score: u8) -> StorageResult<()> {
        let mut tables = self.lock()?;
        if !tables.services.iter().any(|s| s.id == service_id) {
            return Err(StorageError::NotFound(format!("service {service_id}")));
        }
        let id = tables.polls.len() as i64 + 1;
        tables.polls.push(PollRow {
            id,
            service_id,
            score,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn insert_error(&self, service_id: i64, message: &str) -> StorageResult<()> {
        let mut tables = self.lock()?;
        if !tables.services.iter().any(|s| s.id == service_id) {
            return Err(StorageError::NotFound(format!("service {service_id}")));
        }
        let id = tables.errors.len() as i64 + 1;
        tables.errors.push(ErrorRow {
            id,
            service_id,
            message: message.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn insert_team(&self, name: &str) -> StorageResult<Team> {
        let mut tables = self.lock()?;
        let team = Team {
            id: tables.teams.len() as i64 + 1,
            name: name.to_string(),
        };
        tables.teams.push(team.clone());
        Ok(team)
    }

    async fn insert_service(&self, service: NewService) -> StorageResult<Service> {
        let mut tables = self.lock()?;
        let service = Service {
            id: tables.services.len() as i64 + 1,
            team_id: service.team_id,
            kind: service.kind,
            name: service.name,
            connection: service.connection,
            request: service.request,
            expected: service.expected,
            active: service.active,
        };
        tables.services.push(service.clone());
        Ok(service)
    }

    async fn list_teams(&self) -> StorageResult<Vec<Team>> {
        Ok(self.lock()?.teams.clone())
    }

    async fn recent_poll_results(
        &self,
        service_id: i64,
        limit: usize,
    ) -> StorageResult<Vec<PollRow>> {
        let tables = self.lock()?;
        Ok(tables
            .polls
            .iter()
            .rev()
            .filter(|p| p.service_id == service_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn recent_errors(&self, service_id: i64, limit: usize) -> StorageResult<Vec<ErrorRow>> {
        let tables = self.lock()?;
        Ok(tables
            .errors
            .iter()
            .rev()
            .filter(|e| e.service_id == service_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        let tables = self.lock()?;
        Ok(HealthStatus {
            healthy: true,
            message: format!(
                "in-memory: {} services, {} poll rows",
                tables.services.len(),
                tables.polls.len()
            ),
        })
    }

    async fn close(&self) -> StorageResult<()> {
        debug!("closing in-memory backend (data discarded)");
        Ok(())
    }
}
