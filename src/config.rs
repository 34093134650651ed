use std::path::PathBuf;
use std::time::Duration;

use tracing::trace;

/// Storage backend configuration
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (no persistence)
    #[serde(rename = "none")]
    None,

    /// SQLite database (default; shared with the dashboard)
    Sqlite {
        /// Path to the SQLite database file
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./scoreboard.db")
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Storage configuration (optional - defaults to SQLite)
    pub storage: Option<StorageConfig>,

    /// Poller configuration (optional - reference defaults)
    pub poller: Option<PollerConfig>,
}

/// Poller timing and comparison parameters
///
/// Defaults match the reference deployment: 10 s between cycles, 8 s DNS
/// query/lifetime bound, 2 s HTTP timeout. The original system had no FTP
/// bound at all; 8 s is this implementation's configuration default.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PollerConfig {
    /// Seconds to sleep between poll cycles (measured sleep-to-sleep, so the
    /// actual period is interval + cycle duration)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// DNS query timeout and total lifetime bound, in seconds
    #[serde(default = "default_dns_timeout")]
    pub dns_timeout_secs: u64,

    /// HTTP(S) request timeout, in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// FTP connect/read and total retrieval bound, in seconds
    #[serde(default = "default_ftp_timeout")]
    pub ftp_timeout_secs: u64,

    /// Directory holding uploaded expected-result baselines
    #[serde(default = "default_baseline_dir")]
    pub baseline_dir: PathBuf,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            dns_timeout_secs: default_dns_timeout(),
            http_timeout_secs: default_http_timeout(),
            ftp_timeout_secs: default_ftp_timeout(),
            baseline_dir: default_baseline_dir(),
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn ftp_timeout(&self) -> Duration {
        Duration::from_secs(self.ftp_timeout_secs)
    }
}

fn default_interval() -> u64 {
    10
}

fn default_dns_timeout() -> u64 {
    8
}

fn default_http_timeout() -> u64 {
    2
}

fn default_ftp_timeout() -> u64 {
    8
}

fn default_baseline_dir() -> PathBuf {
    PathBuf::from("./data/baselines")
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config: &Config| trace!("loaded config: {config:?}"))
}
