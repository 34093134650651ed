//! SQLite storage backend implementation
//!
//! This module provides a SQLite-based implementation of the
//! `StorageBackend` trait.
//!
//! ## Features
//!
//! - **Embedded**: No separate database server required
//! - **WAL mode**: The poller appends while the dashboard reads
//! - **Connection pooling**: Efficient resource usage
//! - **Migrations**: Automatic schema versioning with sqlx
//!
//! ## Concurrency
//!
//! The poller's writes are append-only inserts; WAL mode plus a busy
//! timeout is enough to tolerate a concurrent request-serving reader
//! without any cross-task locking in this process.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument, warn};

use super::backend::{HealthStatus, StorageBackend};
use super::error::{StorageError, StorageResult};
use super::schema::{ErrorRow, NewService, PollRow, Service, ServiceKind, Team};

/// SQLite storage backend
///
/// Stores the scoreboard tables in a local SQLite database file.
pub struct SqliteBackend {
    pool: Pool<Sqlite>,
    db_path: String,
}

impl SqliteBackend {
    /// Create a new SQLite backend
    ///
    /// This will:
    /// 1. Create the database file if it doesn't exist
    /// 2. Run migrations to create tables
    /// 3. Configure SQLite for concurrent use (WAL mode, busy timeout)
    ///
    /// ## Arguments
    ///
    /// * `db_path` - Path to the SQLite database file (e.g. "./scoreboard.db")
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StorageResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("initializing SQLite backend at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        debug!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;

        info!("database migrations complete");

        Ok(Self {
            pool,
            db_path: db_path_str,
        })
    }

    /// Helper to convert timestamp to Unix milliseconds for SQLite
    fn timestamp_to_millis(dt: &DateTime<Utc>) -> i64 {
        dt.timestamp_millis()
    }

    /// Helper to convert Unix milliseconds from SQLite to DateTime
    fn millis_to_timestamp(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    #[instrument(skip(self))]
    async fn list_active_services(&self) -> StorageResult<Vec<Service>> {
        let rows = sqlx::query(
            r#"
            SELECT id, team_id, kind, name, connection, request, expected, active
            FROM service
            WHERE active = 1
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut services = Vec::with_capacity(rows.len());
        for row in rows {
            let kind_str: String = row.get("kind");
            // Unknown kinds come from the configuration layer; skip the row
            // rather than failing the listing, but leave a trace for the
            // operator.
            let Some(kind) = ServiceKind::parse(&kind_str) else {
                warn!(
                    "skipping service {} with unrecognized kind {:?}",
                    row.get::<i64, _>("id"),
                    kind_str
                );
                continue;
            };

            services.push(Service {
                id: row.get("id"),
                team_id: row.get("team_id"),
                kind,
                name: row.get("name"),
                connection: row.get("connection"),
                request: row.get("request"),
                expected: row.get("expected"),
                active: row.get::<i64, _>("active") != 0,
            });
        }

        debug!("listed {} active services", services.len());
        Ok(services)
    }

    #[instrument(skip(self))]
    async fn insert_poll_result(&self, service_id: i64, score: u8) -> StorageResult<()> {
        sqlx::query("INSERT INTO poll (service_id, score, timestamp) VALUES (?, ?, ?)")
            .bind(service_id)
            .bind(score as i64)
            .bind(Self::timestamp_to_millis(&Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self, message))]
    async fn insert_error(&self, service_id: i64, message: &str) -> StorageResult<()> {
        sqlx::query("INSERT INTO error (service_id, message, timestamp) VALUES (?, ?, ?)")
            .bind(service_id)
            .bind(message)
            .bind(Self::timestamp_to_millis(&Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn insert_team(&self, name: &str) -> StorageResult<Team> {
        let result = sqlx::query("INSERT INTO team (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(Team {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    #[instrument(skip(self, service), fields(name = %service.name))]
    async fn insert_service(&self, service: NewService) -> StorageResult<Service> {
        let result = sqlx::query(
            r#"
            INSERT INTO service (team_id, kind, name, connection, request, expected, active)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(service.team_id)
        .bind(service.kind.as_str())
        .bind(&service.name)
        .bind(&service.connection)
        .bind(&service.request)
        .bind(&service.expected)
        .bind(service.active as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(Service {
            id: result.last_insert_rowid(),
            team_id: service.team_id,
            kind: service.kind,
            name: service.name,
            connection: service.connection,
            request: service.request,
            expected: service.expected,
            active: service.active,
        })
    }

    #[instrument(skip(self))]
    async fn list_teams(&self) -> StorageResult<Vec<Team>> {
        let rows = sqlx::query("SELECT id, name FROM team ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| Team {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn recent_poll_results(
        &self,
        service_id: i64,
        limit: usize,
    ) -> StorageResult<Vec<PollRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, service_id, score, timestamp
            FROM poll
            WHERE service_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(service_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| PollRow {
                id: row.get("id"),
                service_id: row.get("service_id"),
                score: row.get::<i64, _>("score") as u8,
                timestamp: Self::millis_to_timestamp(row.get("timestamp")),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn recent_errors(&self, service_id: i64, limit: usize) -> StorageResult<Vec<ErrorRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, service_id, message, timestamp
            FROM error
            WHERE service_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(service_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| ErrorRow {
                id: row.get("id"),
                service_id: row.get("service_id"),
                message: row.get("message"),
                timestamp: Self::millis_to_timestamp(row.get("timestamp")),
            })
            .collect())
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => Ok(HealthStatus {
                healthy: true,
                message: format!("SQLite operational at {}", self.db_path),
            }),
            Err(e) => Ok(HealthStatus {
                healthy: false,
                message: format!("SQLite error: {}", e),
            }),
        }
    }

    async fn close(&self) -> StorageResult<()> {
        info!("closing SQLite backend");
        self.pool.close().await;
        Ok(())
    }
}
