//! Checker failure paths
//!
//! These tests exercise the transport-failure branches of each checker
//! directly, without a live protocol server on the other side.

use std::time::Duration;

use scorewatch::checkers::{DnsChecker, FtpChecker, HttpChecker, ServiceChecker};
use scorewatch::storage::{Service, ServiceKind};

use crate::helpers::unused_port;

fn service(kind: ServiceKind, connection: &str, request: &str, expected: &str) -> Service {
    Service {
        id: 1,
        team_id: 1,
        kind,
        name: format!("{kind} service"),
        connection: connection.to_string(),
        request: request.to_string(),
        expected: expected.to_string(),
        active: true,
    }
}

#[tokio::test]
async fn test_dns_unreachable_nameserver_times_out() {
    // 192.0.2.0/24 is TEST-NET-1: guaranteed unanswered queries
    let checker = DnsChecker::new(Duration::from_millis(300));
    let service = service(
        ServiceKind::Dns,
        "192.0.2.1",
        "www.team.example",
        "10.0.0.80",
    );

    let outcome = checker.check(&service).await;

    assert!(!outcome.matched);
    assert_eq!(
        outcome.diagnostic.as_deref(),
        Some("DNS Timeout on request for: www.team.example using server: 192.0.2.1")
    );
}

#[tokio::test]
async fn test_http_connection_refused_reports_exception() {
    let baseline_dir = tempfile::tempdir().unwrap();
    let checker = HttpChecker::http(Duration::from_secs(1), baseline_dir.path().to_path_buf());
    let service = service(
        ServiceKind::Http,
        &format!("127.0.0.1:{}", unused_port()),
        "/index.html",
        "index.baseline",
    );

    let outcome = checker.check(&service).await;

    assert!(!outcome.matched);
    assert!(outcome.observed.is_none());
    let diagnostic = outcome.diagnostic.unwrap();
    assert!(
        diagnostic.starts_with("HTTP(S) request resulted in exception:"),
        "unexpected diagnostic: {diagnostic}"
    );
}

#[tokio::test]
async fn test_https_checker_uses_https_scheme() {
    // a plain http listener rejects the TLS handshake, which must surface as
    // a transport exception, not a panic or a hang
    let mock_server = wiremock::MockServer::start().await;
    let baseline_dir = tempfile::tempdir().unwrap();

    let checker = HttpChecker::https(Duration::from_secs(1), baseline_dir.path().to_path_buf());
    let connection = crate::helpers::connection_for(&mock_server.uri());
    let service = service(ServiceKind::Https, &connection, "/", "index.baseline");

    let outcome = checker.check(&service).await;

    assert!(!outcome.matched);
    assert!(
        outcome
            .diagnostic
            .unwrap()
            .starts_with("HTTP(S) request resulted in exception:")
    );
}

#[tokio::test]
async fn test_ftp_connection_refused_reports_exception() {
    let baseline_dir = tempfile::tempdir().unwrap();
    let checker = FtpChecker::new(Duration::from_secs(1), baseline_dir.path().to_path_buf());
    let service = service(
        ServiceKind::Ftp,
        &format!("127.0.0.1:{}", unused_port()),
        "flag.txt",
        "flag.baseline",
    );

    let outcome = checker.check(&service).await;

    assert!(!outcome.matched);
    assert!(outcome.observed.is_none());
    let diagnostic = outcome.diagnostic.unwrap();
    assert!(
        diagnostic.starts_with("FTP request resulted in exception:"),
        "unexpected diagnostic: {diagnostic}"
    );
}
