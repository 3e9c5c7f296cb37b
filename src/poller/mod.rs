//! Submit-then-poll contract shared by every remote generation job.

mod error;
mod job;
mod poll;
mod status;

pub use error::{PollError, SubmissionError, TransportError};
pub use job::{Job, JobError, JobId, JobKind, JobState};
pub use poll::{JobSubmitter, PollConfig, StatusChecker, await_completion, await_job};
pub use status::{RemoteStatus, StatusCheck};
