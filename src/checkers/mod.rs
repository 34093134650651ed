//! Protocol checkers
//!
//! One checker per service kind. Each checker performs exactly one network
//! probe against `service.connection` using `service.request`, bounded by an
//! explicit timeout, and reports an [`Outcome`]. Checkers never touch the
//! store - recording results is the executor's job.
//!
//! Comparison semantics live with their checker because they differ
//! structurally per protocol: exact string match for DNS, truncated
//! line-level match for HTTP(S), byte-exact match for FTP.

pub mod dns;
pub mod ftp;
pub mod http;

use async_trait::async_trait;

use crate::config::PollerConfig;
use crate::storage::{Service, ServiceKind};

pub use dns::DnsChecker;
pub use ftp::FtpChecker;
pub use http::HttpChecker;

/// Verdict of one probe against one service
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Did the observed result match the expected result?
    pub matched: bool,

    /// What the probe observed, when it got far enough to observe anything
    pub observed: Option<String>,

    /// Operator-facing diagnostic, present whenever the probe failed or
    /// mismatched
    pub diagnostic: Option<String>,
}

impl Outcome {
    /// Observed result matched the expected result
    pub fn pass(observed: impl Into<String>) -> Self {
        Self {
            matched: true,
            observed: Some(observed.into()),
            diagnostic: None,
        }
    }

    /// Service reachable, but the observed result differed from expected
    pub fn mismatch(observed: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            matched: false,
            observed: Some(observed.into()),
            diagnostic: Some(diagnostic.into()),
        }
    }

    /// Probe failed before producing an observation
    pub fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            matched: false,
            observed: None,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// A protocol-specific probe strategy
///
/// Implementations must be `Send + Sync`; the executor runs checks from
/// spawned tasks.
#[async_trait]
pub trait ServiceChecker: Send + Sync {
    /// Probe the service once and compare against its expected result
    async fn check(&self, service: &Service) -> Outcome;
}

/// The full set of checkers, one per [`ServiceKind`]
///
/// Dispatch is an exhaustive match on the kind enum - adding a kind without
/// wiring a checker is a compile error, not a silently skipped service.
pub struct CheckerSet {
    dns: Box<dyn ServiceChecker>,
    http: Box<dyn ServiceChecker>,
    https: Box<dyn ServiceChecker>,
    ftp: Box<dyn ServiceChecker>,
}

impl CheckerSet {
    pub fn new(
        dns: Box<dyn ServiceChecker>,
        http: Box<dyn ServiceChecker>,
        https: Box<dyn ServiceChecker>,
        ftp: Box<dyn ServiceChecker>,
    ) -> Self {
        Self {
            dns,
            http,
            https,
            ftp,
        }
    }

    /// Build the production checkers from the poller configuration
    pub fn from_config(config: &PollerConfig) -> Self {
        Self::new(
            Box::new(DnsChecker::new(config.dns_timeout())),
            Box::new(HttpChecker::http(
                config.http_timeout(),
                config.baseline_dir.clone(),
            )),
            Box::new(HttpChecker::https(
                config.http_timeout(),
                config.baseline_dir.clone(),
            )),
            Box::new(FtpChecker::new(
                config.ftp_timeout(),
                config.baseline_dir.clone(),
            )),
        )
    }

    pub fn dispatch(&self, kind: ServiceKind) -> &dyn ServiceChecker {
        match kind {
            ServiceKind::Dns => self.dns.as_ref(),
            ServiceKind::Http => self.http.as_ref(),
            ServiceKind::Https => self.https.as_ref(),
            ServiceKind::Ftp => self.ftp.as_ref(),
        }
    }
}
