//! HTTP(S) checker
//!
//! Issues a GET to `<scheme>://<connection><request>` and compares the
//! response body against a locally stored baseline. Only the first
//! [`COMPARED_LINES`] lines of each side are compared - dynamic page content
//! defeats exact full-page matching - and a mismatch carries a unified line
//! diff of the truncated content.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use similar::TextDiff;
use tracing::{debug, trace};

use super::{Outcome, ServiceChecker};
use crate::storage::Service;

/// Number of leading lines compared between the live body and the baseline
const COMPARED_LINES: usize = 10;

pub struct HttpChecker {
    scheme: &'static str,
    client: reqwest::Client,
    baseline_dir: PathBuf,
}

impl HttpChecker {
    /// Checker for plain-http services
    pub fn http(timeout: Duration, baseline_dir: PathBuf) -> Self {
        Self::new("http", timeout, baseline_dir)
    }

    /// Checker for https services; identical apart from the URL scheme
    pub fn https(timeout: Duration, baseline_dir: PathBuf) -> Self {
        Self::new("https", timeout, baseline_dir)
    }

    fn new(scheme: &'static str, timeout: Duration, baseline_dir: PathBuf) -> Self {
        Self {
            scheme,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            baseline_dir,
        }
    }

    async fn fetch_body(&self, service: &Service) -> reqwest::Result<String> {
        let url = format!(
            "{}://{}{}",
            self.scheme, service.connection, service.request
        );
        trace!("{url}: requesting body");
        self.client.get(&url).send().await?.text().await
    }
}

/// First `n` lines of `s`, line endings preserved
fn leading_lines(s: &str, n: usize) -> String {
    s.split_inclusive('\n').take(n).collect()
}

#[async_trait]
impl ServiceChecker for HttpChecker {
    async fn check(&self, service: &Service) -> Outcome {
        let body = match self.fetch_body(service).await {
            Ok(body) => body,
            Err(e) => {
                debug!("http probe for {} failed: {e}", service.name);
                return Outcome::fail(format!("HTTP(S) request resulted in exception: {e}"));
            }
        };

        let baseline_path = self.baseline_dir.join(&service.expected);
        let baseline = match tokio::fs::read_to_string(&baseline_path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // configuration error, not a network error
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

        let expected = leading_lines(&baseline, COMPARED_LINES);
        let observed = leading_lines(&body, COMPARED_LINES);

        if expected == observed {
            Outcome::pass(observed)
        } else {
            let text_diff = TextDiff::from_lines(expected.as_str(), observed.as_str());
            let diff = text_diff
                .unified_diff()
                .header("expected", "observed")
                .to_string();
            Outcome::mismatch(
                observed,
                format!("HTTP(S) request result did not match expected. Diff:\n{diff}"),
            )
        }
    }
}
