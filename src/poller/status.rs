use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized status of a remote generation job.
///
/// Every remote API speaks its own dialect ("in_progress", "processing",
/// "finished", "completed", ...). Clients parse whatever string they receive
/// through [`RemoteStatus::parse`] so the poller only ever sees this enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteStatus {
    Queued,
    Running,
    Finished,
    Failed,
    /// A status string outside the known vocabulary, kept verbatim.
    Unknown(String),
}

impl RemoteStatus {
    /// Maps a raw status label onto the closed vocabulary.
    ///
    /// Matching ignores ASCII case and surrounding whitespace. Anything not
    /// recognized becomes [`RemoteStatus::Unknown`], never an implicit
    /// success or failure.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "queued" | "pending" | "submitted" => RemoteStatus::Queued,
            "in_progress" | "processing" | "waiting" | "running" | "cancelling" | "starting" => {
                RemoteStatus::Running
            }
            "completed" | "finished" | "succeeded" | "complete" => RemoteStatus::Finished,
            "failed" | "cancelled" | "canceled" | "expired" | "incomplete" | "error" => {
                RemoteStatus::Failed
            }
            _ => RemoteStatus::Unknown(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteStatus::Queued => write!(f, "queued"),
            RemoteStatus::Running => write!(f, "running"),
            RemoteStatus::Finished => write!(f, "finished"),
            RemoteStatus::Failed => write!(f, "failed"),
            RemoteStatus::Unknown(raw) => write!(f, "unknown({raw})"),
        }
    }
}

/// Outcome of a single status check, as classified by a client.
///
/// `R` is the raw, not yet validated result the client fetched for a
/// finished job.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusCheck<R> {
    Finished(R),
    /// The service reported the job dead, with its reason when it gave one.
    Failed(Option<String>),
    /// Queued or running.
    Pending(RemoteStatus),
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assistant_vocabulary() {
        assert_eq!(RemoteStatus::parse("queued"), RemoteStatus::Queued);
        assert_eq!(RemoteStatus::parse("in_progress"), RemoteStatus::Running);
        assert_eq!(RemoteStatus::parse("cancelling"), RemoteStatus::Running);
        assert_eq!(RemoteStatus::parse("completed"), RemoteStatus::Finished);
        assert_eq!(RemoteStatus::parse("expired"), RemoteStatus::Failed);
        assert_eq!(RemoteStatus::parse("cancelled"), RemoteStatus::Failed);
    }

    #[test]
    fn parses_image_vocabulary_case_insensitively() {
        assert_eq!(RemoteStatus::parse("PROCESSING"), RemoteStatus::Running);
        assert_eq!(RemoteStatus::parse(" Finished "), RemoteStatus::Finished);
        assert_eq!(RemoteStatus::parse("Waiting"), RemoteStatus::Running);
        assert_eq!(RemoteStatus::parse("FAILED"), RemoteStatus::Failed);
    }

    #[test]
    fn unrecognized_labels_stay_unknown() {
        assert_eq!(
            RemoteStatus::parse("requires_action"),
            RemoteStatus::Unknown("requires_action".into())
        );
        assert_eq!(RemoteStatus::parse(""), RemoteStatus::Unknown(String::new()));
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(RemoteStatus::Running.to_string(), "running");
        assert_eq!(RemoteStatus::Unknown("odd".into()).to_string(), "unknown(odd)");
    }
}
