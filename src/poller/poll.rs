use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use super::error::{PollError, SubmissionError, TransportError};
use super::job::{Job, JobError, JobId};
use super::status::{RemoteStatus, StatusCheck};

/// Lower bound on the pause between two checks, so a zero interval cannot spin.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Creates jobs on a remote service.
///
/// Kept apart from [`StatusChecker`]: the poller only ever receives a
/// checker, so it has no way to submit a job twice.
#[allow(async_fn_in_trait)]
pub trait JobSubmitter {
    type Request: ?Sized;

    async fn submit(&self, request: &Self::Request) -> Result<JobId, SubmissionError>;
}

/// Read-only view of a remote job.
#[allow(async_fn_in_trait)]
pub trait StatusChecker {
    /// Whatever the client fetched for a finished job, before validation.
    type Raw;
    /// The validated result handed to callers.
    type Payload;

    /// Performs exactly one status round trip for `job_id`.
    async fn check_status(&self, job_id: &JobId) -> Result<StatusCheck<Self::Raw>, TransportError>;

    /// Validates the raw result of a finished job.
    fn decode(&self, raw: Self::Raw) -> Result<Self::Payload, String>;
}

/// Timing of one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl PollConfig {
    pub fn new(poll_interval: Duration, max_wait: Duration) -> Self {
        Self {
            poll_interval,
            max_wait,
        }
    }

    /// Assistant runs: check every second, give up after five minutes.
    pub fn text_default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(300))
    }

    /// Image jobs: check every ten seconds, give up after five minutes.
    pub fn image_default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(300))
    }
}

/// Waits until the job behind `job_id` reaches a terminal state.
///
/// Checks run back to back with a sleep of `poll_interval` after every
/// non-terminal observation. The loop ends on the first finished, failed or
/// unreachable check, when `max_wait` is used up, or when `cancel` fires.
/// Unrecognized statuses are logged and waited on like running ones.
pub async fn await_completion<C: StatusChecker>(
    job_id: &JobId,
    checker: &C,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<C::Payload, PollError> {
    poll_loop(job_id, checker, config, cancel, |_| {}).await
}

/// Same as [`await_completion`], recording observations and the outcome on `job`.
pub async fn await_job<C: StatusChecker>(
    job: &mut Job<C::Payload>,
    checker: &C,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<(), JobError> {
    job.ensure_open()?;
    let job_id = job.job_id.clone();
    let outcome = poll_loop(&job_id, checker, config, cancel, |status| job.advance(status)).await;
    job.settle(outcome)
}

async fn poll_loop<C: StatusChecker>(
    job_id: &JobId,
    checker: &C,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut observe: impl FnMut(&RemoteStatus),
) -> Result<C::Payload, PollError> {
    let started = Instant::now();
    let mut last_status = RemoteStatus::Queued;
    let mut checks: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(cancelled(job_id, last_status, started));
        }

        let elapsed = started.elapsed();
        if checks > 0 && elapsed >= config.max_wait {
            tracing::warn!(job_id = %job_id, checks, elapsed_ms = elapsed.as_millis() as u64, status = %last_status, "Wait budget exhausted");
            return Err(match last_status {
                RemoteStatus::Unknown(status) => PollError::UnknownState {
                    job_id: job_id.clone(),
                    status,
                    elapsed,
                },
                last_status => PollError::Timeout {
                    job_id: job_id.clone(),
                    last_status,
                    elapsed,
                    checks,
                },
            });
        }

        checks += 1;
        let check = match checker.check_status(job_id).await {
            Ok(check) => check,
            Err(source) => {
                tracing::warn!(job_id = %job_id, checks, error = %source, "Status check failed");
                return Err(PollError::Transport {
                    job_id: job_id.clone(),
                    last_status,
                    elapsed: started.elapsed(),
                    source,
                });
            }
        };

        match check {
            StatusCheck::Finished(raw) => {
                let elapsed = started.elapsed();
                return match checker.decode(raw) {
                    Ok(payload) => {
                        tracing::info!(job_id = %job_id, checks, elapsed_ms = elapsed.as_millis() as u64, "Job finished");
                        Ok(payload)
                    }
                    Err(detail) => {
                        tracing::warn!(job_id = %job_id, %detail, "Job finished with malformed result");
                        Err(PollError::MalformedResult {
                            job_id: job_id.clone(),
                            detail,
                            elapsed,
                        })
                    }
                };
            }
            StatusCheck::Failed(reason) => {
                let reason = reason.unwrap_or_else(|| "service gave no reason".to_string());
                tracing::warn!(job_id = %job_id, checks, %reason, "Job failed remotely");
                return Err(PollError::RemoteFailure {
                    job_id: job_id.clone(),
                    reason,
                    elapsed: started.elapsed(),
                });
            }
            StatusCheck::Pending(status) => {
                tracing::debug!(job_id = %job_id, checks, status = %status, "Job still pending");
                last_status = status;
            }
            StatusCheck::Unknown(raw) => {
                tracing::warn!(job_id = %job_id, checks, status = %raw, "Unrecognized job status, still waiting");
                last_status = RemoteStatus::Unknown(raw);
            }
        }
        observe(&last_status);

        let remaining = config.max_wait.saturating_sub(started.elapsed());
        let pause = config.poll_interval.max(MIN_POLL_INTERVAL).min(remaining);
        tokio::select! {
            _ = cancel.cancelled() => return Err(cancelled(job_id, last_status, started)),
            _ = sleep(pause) => {}
        }
    }
}

fn cancelled(job_id: &JobId, last_status: RemoteStatus, started: Instant) -> PollError {
    tracing::info!(job_id = %job_id, status = %last_status, "Wait cancelled");
    PollError::Cancelled {
        job_id: job_id.clone(),
        last_status,
        elapsed: started.elapsed(),
    }
}
