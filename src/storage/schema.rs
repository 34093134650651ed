//! Row definitions for the scoreboard database
//!
//! ## Design Philosophy
//!
//! The poller and the (external) dashboard share one store but touch
//! disjoint data: the poller reads `team`/`service` rows and appends
//! `poll`/`error` rows, the dashboard does the reverse. All rows cross the
//! storage boundary as typed structs with named fields - no dynamic row
//! access leaks out of the backends.
//!
//! `ServiceKind` is a closed enum. The kind column is free text in the
//! database (the configuration layer writes it), so backends validate it
//! when listing services; rows with an unrecognized kind are skipped with a
//! warning rather than failing the whole listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Protocol family of a service, determining which checker applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Dns,
    Http,
    Https,
    Ftp,
}

impl ServiceKind {
    /// Parse a kind string as stored in the database
    ///
    /// Returns `None` for unknown kinds so callers can decide whether to
    /// skip or fail; the poller skips.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dns" => Some(ServiceKind::Dns),
            "http" => Some(ServiceKind::Http),
            "https" => Some(ServiceKind::Https),
            "ftp" => Some(ServiceKind::Ftp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Dns => "dns",
            ServiceKind::Http => "http",
            ServiceKind::Https => "https",
            ServiceKind::Ftp => "ftp",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A team owning zero or more services
///
/// Created and mutated by the configuration layer; the poller only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

/// A monitored service definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub team_id: i64,
    pub kind: ServiceKind,
    pub name: String,

    /// Connection target: nameserver IP for dns, host\[:port\] otherwise
    pub connection: String,

    /// Request payload: hostname to resolve, URL path, or remote file path
    pub request: String,

    /// Expected result: an IP string for dns, a baseline filename otherwise
    pub expected: String,

    /// Only active services are polled
    pub active: bool,
}

/// Fields for inserting a new service (id is assigned by the store)
#[derive(Debug, Clone)]
pub struct NewService {
    pub team_id: i64,
    pub kind: ServiceKind,
    pub name: String,
    pub connection: String,
    pub request: String,
    pub expected: String,
    pub active: bool,
}

/// Append-only pass/fail record for one service at one cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRow {
    pub id: i64,
    pub service_id: i64,

    /// 1 = observed result matched expected, 0 = mismatch or probe failure
    pub score: u8,

    pub timestamp: DateTime<Utc>,
}

/// Append-only diagnostic for a failed or mismatched probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRow {
    pub id: i64,
    pub service_id: i64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
