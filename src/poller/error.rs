//! Error taxonomy of the job poller.
//!
//! [`SubmissionError`] means no job exists at all. [`TransportError`] means a
//! single status round trip failed. [`PollError`] is what
//! [`await_completion`](super::await_completion) returns, and every variant
//! carries the job id and the time spent waiting so the shell can print an
//! actionable message.

use std::time::Duration;

use thiserror::Error;

use super::job::JobId;
use super::status::RemoteStatus;

/// The remote service refused or never acknowledged a new job.
#[derive(Debug, Clone, Error)]
#[error("submission failed: {message}")]
pub struct SubmissionError {
    pub message: String,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One status-check round trip could not be completed.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PollError {
    /// The service confirmed the job is dead.
    #[error("job {job_id} failed remotely after {elapsed:.1?}: {reason}")]
    RemoteFailure {
        job_id: JobId,
        reason: String,
        elapsed: Duration,
    },

    /// The wait budget ran out while the job was still queued or running.
    /// The job may still finish remotely.
    #[error("job {job_id} still {last_status} after {elapsed:.1?} ({checks} checks)")]
    Timeout {
        job_id: JobId,
        last_status: RemoteStatus,
        elapsed: Duration,
        checks: u32,
    },

    /// The budget ran out and the last status seen was outside the known vocabulary.
    #[error("job {job_id} reported unrecognized status {status:?} until the budget ran out after {elapsed:.1?}")]
    UnknownState {
        job_id: JobId,
        status: String,
        elapsed: Duration,
    },

    #[error("status check for job {job_id} failed after {elapsed:.1?} (last status: {last_status}): {source}")]
    Transport {
        job_id: JobId,
        last_status: RemoteStatus,
        elapsed: Duration,
        #[source]
        source: TransportError,
    },

    /// The job finished but its result did not have the expected shape.
    #[error("job {job_id} finished after {elapsed:.1?} with an unusable result: {detail}")]
    MalformedResult {
        job_id: JobId,
        detail: String,
        elapsed: Duration,
    },

    #[error("wait for job {job_id} cancelled after {elapsed:.1?} (last status: {last_status})")]
    Cancelled {
        job_id: JobId,
        last_status: RemoteStatus,
        elapsed: Duration,
    },
}

impl PollError {
    pub fn job_id(&self) -> &JobId {
        match self {
            PollError::RemoteFailure { job_id, .. }
            | PollError::Timeout { job_id, .. }
            | PollError::UnknownState { job_id, .. }
            | PollError::Transport { job_id, .. }
            | PollError::MalformedResult { job_id, .. }
            | PollError::Cancelled { job_id, .. } => job_id,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            PollError::RemoteFailure { elapsed, .. }
            | PollError::Timeout { elapsed, .. }
            | PollError::UnknownState { elapsed, .. }
            | PollError::Transport { elapsed, .. }
            | PollError::MalformedResult { elapsed, .. }
            | PollError::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    /// Last status the service reported before the wait ended.
    pub fn last_status(&self) -> RemoteStatus {
        match self {
            PollError::RemoteFailure { .. } => RemoteStatus::Failed,
            PollError::MalformedResult { .. } => RemoteStatus::Finished,
            PollError::UnknownState { status, .. } => RemoteStatus::Unknown(status.clone()),
            PollError::Timeout { last_status, .. }
            | PollError::Transport { last_status, .. }
            | PollError::Cancelled { last_status, .. } => last_status.clone(),
        }
    }

    /// True when the wait ended without the service confirming an outcome.
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            PollError::Timeout { .. } | PollError::UnknownState { .. } | PollError::Cancelled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> JobId {
        JobId::new("gen_42").unwrap()
    }

    #[test]
    fn remote_failure_display_carries_reason() {
        let err = PollError::RemoteFailure {
            job_id: id(),
            reason: "bad prompt".into(),
            elapsed: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "job gen_42 failed remotely after 10.0s: bad prompt"
        );
    }

    #[test]
    fn timeout_display_carries_last_status_and_checks() {
        let err = PollError::Timeout {
            job_id: id(),
            last_status: RemoteStatus::Running,
            elapsed: Duration::from_secs(30),
            checks: 3,
        };
        assert_eq!(err.to_string(), "job gen_42 still running after 30.0s (3 checks)");
        assert!(err.is_unresolved());
        assert_eq!(err.elapsed(), Duration::from_secs(30));
    }

    #[test]
    fn transport_error_is_source() {
        let err = PollError::Transport {
            job_id: id(),
            last_status: RemoteStatus::Queued,
            elapsed: Duration::ZERO,
            source: TransportError::new("connection reset"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("connection reset"));
        assert!(!err.is_unresolved());
        assert_eq!(err.job_id().as_str(), "gen_42");
    }

    #[test]
    fn last_status_per_variant() {
        let unknown = PollError::UnknownState {
            job_id: id(),
            status: "paused".into(),
            elapsed: Duration::from_secs(300),
        };
        assert_eq!(unknown.last_status(), RemoteStatus::Unknown("paused".into()));

        let malformed = PollError::MalformedResult {
            job_id: id(),
            detail: "no url".into(),
            elapsed: Duration::ZERO,
        };
        assert_eq!(malformed.last_status(), RemoteStatus::Finished);
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PollError>();
        assert_send_sync::<SubmissionError>();
    }
}
