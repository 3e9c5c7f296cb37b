pub mod client;
pub mod error;
pub mod reply;
pub mod types;

pub use client::{AssistantRun, OpenAiClient};
pub use error::OpenAiError;
pub use reply::parse_reply_list;
pub use types::{Run, RunHandle, ThreadMessage};
