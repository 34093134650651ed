//! Poll scheduler
//!
//! Drives the cycle executor on a fixed interval, forever. The interval is
//! measured from the end of one sleep to the start of the next, so the
//! actual period is interval + cycle duration - matching the reference
//! behavior of sleeping first, then polling.
//!
//! The loop must outlive any single cycle: errors *and panics* escaping a
//! cycle are caught here and logged, and the next cycle starts on schedule.
//! This is a deliberate availability guarantee for an unattended poller;
//! nothing short of process exit stops it.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, error, info};

use crate::executor::CycleExecutor;

pub struct PollScheduler {
    executor: CycleExecutor,
    interval: Duration,
}

impl PollScheduler {
    pub fn new(executor: CycleExecutor, interval: Duration) -> Self {
        Self { executor, interval }
    }

    /// Run cycles until the process exits
    ///
    /// Intended to be spawned once at startup as a background task,
    /// independent of any request-serving component.
    pub async fn run(self) {
        info!(
            "poll scheduler started, {} seconds between cycles",
            self.interval.as_secs()
        );

        loop {
            tokio::time::sleep(self.interval).await;

            match AssertUnwindSafe(self.executor.run_cycle())
                .catch_unwind()
                .await
            {
                Ok(Ok(summary)) => {
                    debug!(
                        "scheduled cycle finished: {}/{} passed",
                        summary.passed, summary.polled
                    );
                }
                Ok(Err(e)) => error!("poll cycle failed: {e:#}"),
                Err(_) => error!("poll cycle panicked, resuming on next interval"),
            }
        }
    }
}
