use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::{PollError, SubmissionError};
use super::status::RemoteStatus;

/// Opaque handle issued by a remote service when a job is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wraps a handle returned by a remote service. Blank handles are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, SubmissionError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SubmissionError::new("service returned an empty job id"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
    TextGeneration,
    ImageGeneration,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::TextGeneration => write!(f, "text"),
            JobKind::ImageGeneration => write!(f, "image"),
        }
    }
}

/// Lifecycle state of a [`Job`] as seen by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
    TimedOut,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::TimedOut)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("job {job_id} is already {state:?}")]
    AlreadyTerminal { job_id: JobId, state: JobState },
}

/// One outstanding request to a generation service.
///
/// Created at submission, advanced by status observations, and frozen by a
/// single call to [`Job::settle`]. `result` and `error` are never both set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job<P> {
    pub job_id: JobId,
    pub kind: JobKind,
    pub submitted_at: DateTime<Utc>,
    state: JobState,
    result: Option<P>,
    error: Option<String>,
}

impl<P> Job<P> {
    pub fn submitted(job_id: JobId, kind: JobKind) -> Self {
        Self {
            job_id,
            kind,
            submitted_at: Utc::now(),
            state: JobState::Queued,
            result: None,
            error: None,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn result(&self) -> Option<&P> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records a non-terminal status observation.
    ///
    /// Only `Queued -> Running` is a transition here; terminal outcomes go
    /// through [`Job::settle`] once the poller has validated them.
    pub fn observe(&mut self, status: &RemoteStatus) -> Result<(), JobError> {
        self.ensure_open()?;
        self.advance(status);
        Ok(())
    }

    /// Applies an observation to a job already known to be open.
    pub(crate) fn advance(&mut self, status: &RemoteStatus) {
        if self.state == JobState::Queued && *status == RemoteStatus::Running {
            self.state = JobState::Running;
        }
    }

    /// Performs the one terminal transition.
    pub fn settle(&mut self, outcome: Result<P, PollError>) -> Result<(), JobError> {
        self.ensure_open()?;
        match outcome {
            Ok(payload) => {
                self.state = JobState::Completed;
                self.result = Some(payload);
            }
            Err(err) => {
                self.state = if err.is_unresolved() {
                    JobState::TimedOut
                } else {
                    JobState::Failed
                };
                self.error = Some(err.to_string());
            }
        }
        Ok(())
    }

    /// Consumes the job, yielding its payload or error message.
    ///
    /// A job that was never settled yields an error naming its state.
    pub fn into_outcome(self) -> Result<P, String> {
        match (self.result, self.error) {
            (Some(payload), _) => Ok(payload),
            (None, Some(error)) => Err(error),
            (None, None) => Err(format!("job {} is still {:?}", self.job_id, self.state)),
        }
    }

    pub(crate) fn ensure_open(&self) -> Result<(), JobError> {
        if self.state.is_terminal() {
            return Err(JobError::AlreadyTerminal {
                job_id: self.job_id.clone(),
                state: self.state,
            });
        }
        Ok(())
    }
}
