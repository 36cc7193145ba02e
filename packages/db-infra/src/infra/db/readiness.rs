use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::DbInfraError;
use crate::infra::db::probe::ReadinessProbe;

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_UNRECOVERABLE_AFTER: Duration = Duration::from_secs(30);
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timing knobs for [`wait_until_ready`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Fixed pause between failed attempts. Never grows.
    pub retry_interval: Duration,
    /// Once the wait has lasted longer than this, failures are logged with
    /// the underlying error.
    pub unrecoverable_after: Duration,
    /// Upper bound for a single connection attempt.
    pub attempt_timeout: Duration,
    /// Give up after this long. `None` waits forever.
    pub deadline: Option<Duration>,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            unrecoverable_after: DEFAULT_UNRECOVERABLE_AFTER,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            deadline: None,
        }
    }
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Block until `probe` succeeds.
///
/// Operational failures are retried every `policy.retry_interval`; any other
/// error is returned immediately. The wait ends early only when `cancel` fires
/// or the optional deadline passes.
pub async fn wait_until_ready<P>(
    probe: &P,
    policy: &ReadinessPolicy,
    cancel: &CancellationToken,
) -> Result<Readiness, DbInfraError>
where
    P: ReadinessProbe + ?Sized,
{
    let target = probe.target();
    let start = Instant::now();
    let mut attempts: u32 = 0;

    info!(
        target_url = %target,
        interval_ms = policy.retry_interval.as_millis(),
        deadline_ms = policy.deadline.map(|d| d.as_millis()),
        "readiness=start"
    );

    loop {
        attempts += 1;

        let outcome = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                return Err(cancelled(start, attempts));
            }
            res = tokio::time::timeout(policy.attempt_timeout, probe.probe()) => res,
        };

        let failure = match outcome {
            Ok(Ok(())) => {
                let readiness = Readiness {
                    attempts,
                    elapsed: start.elapsed(),
                };
                info!(
                    attempts,
                    elapsed_ms = readiness.elapsed.as_millis(),
                    "readiness=ready"
                );
                return Ok(readiness);
            }
            Ok(Err(e)) if e.is_retryable() => e,
            Ok(Err(e)) => {
                error!(attempt = attempts, error = %e, "readiness=failed retryable=false");
                return Err(e);
            }
            Err(_) => DbInfraError::unavailable(format!(
                "connection attempt timed out after {}ms",
                policy.attempt_timeout.as_millis()
            )),
        };

        let elapsed = start.elapsed();
        if elapsed > policy.unrecoverable_after {
            warn!(
                attempt = attempts,
                elapsed_ms = elapsed.as_millis(),
                error = %failure,
                "Waiting for PostgreSQL to become available... This is taking longer than expected; the error may be unrecoverable"
            );
        } else {
            info!(
                attempt = attempts,
                elapsed_ms = elapsed.as_millis(),
                "Waiting for PostgreSQL to become available..."
            );
        }

        if let Some(deadline) = policy.deadline {
            if elapsed >= deadline {
                error!(
                    attempts,
                    elapsed_ms = elapsed.as_millis(),
                    "readiness=deadline_exceeded"
                );
                return Err(DbInfraError::DeadlineExceeded {
                    elapsed_ms: elapsed.as_millis(),
                    attempts,
                    last_error: failure.to_string(),
                });
            }
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                return Err(cancelled(start, attempts));
            }
            _ = tokio::time::sleep(policy.retry_interval) => {}
        }
    }
}

fn cancelled(start: Instant, attempts: u32) -> DbInfraError {
    let elapsed_ms = start.elapsed().as_millis();
    info!(elapsed_ms, attempts, "readiness=cancelled");
    DbInfraError::Cancelled {
        elapsed_ms,
        attempts,
    }
}
