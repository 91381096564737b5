//! Application service: status poller.
//!
//! Fixed-interval polling of a [`StatusSource`] until both the agent and its
//! endpoint are terminal or the timeout elapses. No backoff, no jitter.

use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::application::ports::StatusSource;
use crate::domain::error::TimeoutError;
use crate::domain::{DeploymentStatus, RuntimeRecord};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// How polling ended. A timeout is not an error at this level: the caller
/// decides whether "still in progress" is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Both statuses reached a terminal state (ready or failed).
    Settled(DeploymentStatus),
    /// Gave up waiting; `last` is the final non-terminal snapshot.
    TimedOut {
        last: DeploymentStatus,
        elapsed: Duration,
    },
}

impl PollOutcome {
    /// Settled status, or a [`TimeoutError`] carrying the last observation.
    ///
    /// # Errors
    ///
    /// Returns [`TimeoutError`] for `TimedOut`.
    pub fn into_settled(self) -> Result<DeploymentStatus, TimeoutError> {
        match self {
            Self::Settled(status) => Ok(status),
            Self::TimedOut { last, elapsed } => Err(TimeoutError {
                elapsed,
                agent: last.agent.status,
                endpoint: last.endpoint.status,
            }),
        }
    }
}

/// Poll until terminal or timeout.
///
/// The first fetch is immediate. A failed fetch counts as an all-`UNKNOWN`
/// snapshot and polling continues. The last sleep is clamped to the time
/// remaining, so this returns within one interval of `options.timeout`.
/// `on_snapshot` sees every observation with the elapsed time.
pub async fn poll_until_terminal(
    source: &impl StatusSource,
    record: &RuntimeRecord,
    options: PollOptions,
    mut on_snapshot: impl FnMut(&DeploymentStatus, Duration),
) -> PollOutcome {
    let started = Instant::now();
    loop {
        let status = match source.fetch_status(record).await {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(error = %format!("{e:#}"), "status fetch failed, treating as UNKNOWN");
                DeploymentStatus::unknown()
            }
        };
        let elapsed = started.elapsed();
        tracing::debug!(
            agent = %status.agent.status,
            endpoint = %status.endpoint.status,
            elapsed_secs = elapsed.as_secs(),
            "status snapshot"
        );
        on_snapshot(&status, elapsed);

        if status.is_terminal() {
            return PollOutcome::Settled(status);
        }
        if elapsed >= options.timeout {
            return PollOutcome::TimedOut {
                last: status,
                elapsed,
            };
        }
        sleep(options.interval.min(options.timeout - elapsed)).await;
    }
}
