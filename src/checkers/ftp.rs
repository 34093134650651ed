//! FTP checker
//!
//! Anonymous-logs into the service's connection target, retrieves the
//! requested file in binary mode into memory and compares the bytes exactly
//! against the stored baseline.
//!
//! The reference system had no FTP timeout at all; here the configured bound
//! caps connect, socket reads/writes and the total retrieval.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use suppaftp::FtpStream;
use suppaftp::types::FileType;
use tracing::debug;

use super::{Outcome, ServiceChecker};
use crate::storage::Service;

const FTP_PORT: u16 = 21;

pub struct FtpChecker {
    timeout: Duration,
    baseline_dir: PathBuf,
}

impl FtpChecker {
    pub fn new(timeout: Duration, baseline_dir: PathBuf) -> Self {
        Self {
            timeout,
            baseline_dir,
        }
    }

    async fn retrieve(&self, connection: &str, request: &str) -> Result<Vec<u8>> {
        let connection = connection.to_string();
        let request = request.to_string();
        let timeout = self.timeout;

        // suppaftp's client is blocking; one short transfer per probe is
        // cheap enough for the blocking pool.
        let transfer = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let addr = resolve_addr(&connection)?;
            let mut ftp = FtpStream::connect_timeout(addr, timeout)
                .with_context(|| format!("connect to {addr} failed"))?;
            ftp.get_ref().set_read_timeout(Some(timeout))?;
            ftp.get_ref().set_write_timeout(Some(timeout))?;
            ftp.login("anonymous", "anonymous").context("login failed")?;
            ftp.transfer_type(FileType::Binary)
                .context("could not switch to binary mode")?;
            let buffer = ftp
                .retr_as_buffer(&request)
                .with_context(|| format!("retrieval of {request} failed"))?;
            let _ = ftp.quit();
            Ok(buffer.into_inner())
        });

        // Total lifetime bound. An abandoned transfer cannot linger past the
        // socket timeouts set above.
        match tokio::time::timeout(timeout, transfer).await {
            Ok(joined) => joined.context("transfer task failed")?,
            Err(_) => Err(anyhow!("transfer exceeded {} second bound", timeout.as_secs())),
        }
    }
}

fn resolve_addr(connection: &str) -> Result<SocketAddr> {
    let target = if connection.contains(':') {
        connection.to_string()
    } else {
        format!("{connection}:{FTP_PORT}")
    };
    target
        .to_socket_addrs()
        .with_context(|| format!("could not resolve {target}"))?
        .next()
        .ok_or_else(|| anyhow!("no addresses for {target}"))
}

#[async_trait]
impl ServiceChecker for FtpChecker {
    async fn check(&self, service: &Service) -> Outcome {
        let observed = match self.retrieve(&service.connection, &service.request).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("ftp probe for {} failed: {e:#}", service.name);
                return Outcome::fail(format!("FTP request resulted in exception: {e:#}"));
            }
        };

        let baseline_path = self.baseline_dir.join(&service.expected);
        let expected = match tokio::fs::read(&baseline_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Outcome::fail(format!(
                    "Local filename for expected result: {} does not exist.",
                    service.expected
                ));
            }
            Err(e) => {
                return Outcome::fail(format!(
                    "Failed to read expected result {}: {e}",
                    baseline_path.display()
                ));
            }
        };

        if observed == expected {
            Outcome::pass(String::from_utf8_lossy(&observed))
        } else {
            let observed_text = String::from_utf8_lossy(&observed).into_owned();
            let diagnostic = format!(
                "FTP Request result: {observed_text} did not match expected: {}",
                String::from_utf8_lossy(&expected)
            );
            Outcome::mismatch(observed_text, diagnostic)
        }
    }
}
