//! Storage backend trait definition
//!
//! This module defines the narrow gateway the poller uses against the
//! persistent store. The poller itself only ever calls three operations
//! (`list_active_services`, `insert_poll_result`, `insert_error`); the rest
//! of the trait covers the setup/dashboard side of the same tables so both
//! halves of the system can share one backend implementation.

use async_trait::async_trait;

use super::error::StorageResult;
use super::schema::{ErrorRow, NewService, PollRow, Service, Team};

/// Health status of the storage backend
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Is the backend operational?
    pub healthy: bool,

    /// Human-readable status message
    pub message: String,
}

/// Trait for scoreboard storage backends
///
/// Implementations must be `Send + Sync` as they are shared between the
/// background poller task and any request-serving component.
///
/// ## Write semantics
///
/// `insert_poll_result` and `insert_error` are append-only: rows are never
/// updated or deleted by the poller, and backends must tolerate a concurrent
/// reader (the dashboard) without corruption.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// List all services flagged active, with their kind resolved
    ///
    /// Rows whose kind column does not parse as a known [`super::schema::ServiceKind`]
    /// are skipped (with a logged warning), never returned and never fatal -
    /// a misconfigured service must not take down the poll cycle.
    async fn list_active_services(&self) -> StorageResult<Vec<Service>>;

    /// Append one pass/fail record for a service
    ///
    /// `score` is 1 for a match and 0 for a mismatch or probe failure.
    async fn insert_poll_result(&self, service_id: i64, score: u8) -> StorageResult<()>;

    /// Append one diagnostic message for a service
    async fn insert_error(&self, service_id: i64, message: &str) -> StorageResult<()>;

    // ========================================================================
    // Configuration-side operations (setup tooling and tests)
    // ========================================================================

    /// Insert a team and return it with its assigned id
    async fn insert_team(&self, name: &str) -> StorageResult<Team>;

    /// Insert a service definition and return it with its assigned id
    async fn insert_service(&self, service: NewService) -> StorageResult<Service>;

    /// List all teams
    async fn list_teams(&self) -> StorageResult<Vec<Team>>;

    // ========================================================================
    // Read side consumed by the scoreboard/errors display
    // ========================================================================

    /// The N most recent poll results for a service, newest first
    async fn recent_poll_results(&self, service_id: i64, limit: usize)
    -> StorageResult<Vec<PollRow>>;

    /// The N most recent error records for a service, newest first
    async fn recent_errors(&self, service_id: i64, limit: usize) -> StorageResult<Vec<ErrorRow>>;

    /// Check backend health
    ///
    /// Performs a lightweight operation to verify the backend is operational
    /// (e.g. ping database, check file access).
    async fn health_check(&self) -> StorageResult<HealthStatus>;

    /// Close the backend and release resources
    async fn close(&self) -> StorageResult<()>;
}
