//! SQLite persistence tests
//!
//! Poll history written by the executor must survive closing and reopening
//! the backend - the scoreboard reads it from another process.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use scorewatch::checkers::Outcome;
use scorewatch::executor::CycleExecutor;
use scorewatch::storage::sqlite::SqliteBackend;
use scorewatch::storage::{NewService, ServiceKind, StorageBackend};

use crate::helpers::*;

fn web_service(team_id: i64) -> NewService {
    NewService {
        team_id,
        kind: ServiceKind::Http,
        name: "team web".to_string(),
        connection: "127.0.0.1:8080".to_string(),
        request: "/index.html".to_string(),
        expected: "index.baseline".to_string(),
        active: true,
    }
}

#[tokio::test]
async fn test_poll_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("scores.db");

    let service_id = {
        let backend = Arc::new(SqliteBackend::new(&db_path).await.unwrap());
        let team = backend.insert_team("blue").await.unwrap();
        let service = backend.insert_service(web_service(team.id)).await.unwrap();

        let config = test_poller_config(dir.path().to_path_buf());
        let executor =
            CycleExecutor::new(backend.clone(), static_set(Outcome::pass("ok")), &config);
        executor.run_cycle().await.unwrap();
        executor.run_cycle().await.unwrap();

        backend.close().await.unwrap();
        service.id
    };

    let reopened = SqliteBackend::new(&db_path).await.unwrap();
    let polls = reopened.recent_poll_results(service_id, 10).await.unwrap();
    assert_eq!(polls.len(), 2);
    assert!(polls.iter().all(|p| p.score == 1));
}

#[tokio::test]
async fn test_error_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("scores.db");

    let service_id = {
        let backend = Arc::new(SqliteBackend::new(&db_path).await.unwrap());
        let team = backend.insert_team("blue").await.unwrap();
        let service = backend.insert_service(web_service(team.id)).await.unwrap();

        let config = test_poller_config(dir.path().to_path_buf());
        let executor = CycleExecutor::new(
            backend.clone(),
            static_set(Outcome::mismatch(
                "defaced page",
                "HTTP(S) request result did not match expected. Diff:\n-team page\n+defaced page",
            )),
            &config,
        );
        executor.run_cycle().await.unwrap();

        backend.close().await.unwrap();
        service.id
    };

    let reopened = SqliteBackend::new(&db_path).await.unwrap();

    let polls = reopened.recent_poll_results(service_id, 10).await.unwrap();
    assert_eq!(polls.len(), 1);
    assert_eq!(polls[0].score, 0);

    let errors = reopened.recent_errors(service_id, 10).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("did not match expected"));
}
