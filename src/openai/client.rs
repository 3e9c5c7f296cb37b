use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::error::OpenAiError;
use super::types::{CreateMessage, CreateRun, MessageList, Run, RunHandle, Thread, ThreadMessage};
use crate::config::OpenAiConfig;
use crate::http;
use crate::poller::{
    JobId, JobSubmitter, RemoteStatus, StatusCheck, StatusChecker, SubmissionError, TransportError,
};

pub struct OpenAiClient {
    api_key: String,
    assistant_id: String,
    base_url: String,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, OpenAiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            api_key: config.api_key.clone(),
            assistant_id: config.assistant_id.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Read-only view of runs whose final reply is decoded with `decode`.
    pub fn runs<T>(&self, decode: fn(&str) -> Result<T, String>) -> AssistantRun<'_, T> {
        AssistantRun {
            client: self,
            decode,
        }
    }

    pub async fn retrieve_run(&self, handle: &RunHandle) -> Result<Run, OpenAiError> {
        let url = self.url(&format!("threads/{}/runs/{}", handle.thread_id, handle.run_id));
        self.send(self.client.get(url)).await
    }

    /// Text of the newest assistant message in the thread.
    pub async fn latest_reply(&self, thread_id: &str) -> Result<Option<String>, OpenAiError> {
        let url = self.url(&format!("threads/{thread_id}/messages"));
        let list: MessageList = self
            .send(self.client.get(url).query(&[("order", "desc"), ("limit", "10")]))
            .await?;
        Ok(list
            .data
            .iter()
            .find(|msg| msg.role == "assistant")
            .and_then(ThreadMessage::first_text)
            .map(str::to_string))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, OpenAiError> {
        let request = request
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2");
        Ok(http::send_json(request).await?)
    }
}

impl JobSubmitter for OpenAiClient {
    type Request = str;

    /// Creates a thread holding `instruction` and starts the configured assistant on it.
    async fn submit(&self, instruction: &str) -> Result<JobId, SubmissionError> {
        if self.assistant_id.is_empty() {
            return Err(SubmissionError::new("assistant_id is not configured"));
        }

        let thread: Thread = self
            .send(self.client.post(self.url("threads")).json(&serde_json::json!({})))
            .await?;
        let _: ThreadMessage = self
            .send(
                self.client
                    .post(self.url(&format!("threads/{}/messages", thread.id)))
                    .json(&CreateMessage {
                        role: "user".into(),
                        content: instruction.to_string(),
                    }),
            )
            .await?;
        let run: Run = self
            .send(
                self.client
                    .post(self.url(&format!("threads/{}/runs", thread.id)))
                    .json(&CreateRun {
                        assistant_id: self.assistant_id.clone(),
                    }),
            )
            .await?;

        let handle = RunHandle {
            thread_id: thread.id,
            run_id: run.id,
        };
        tracing::info!(job_id = %handle, status = %run.status, "Assistant run started");
        JobId::new(handle.to_string())
    }
}

/// Status checker for assistant runs, decoding the final reply into `T`.
pub struct AssistantRun<'a, T> {
    client: &'a OpenAiClient,
    decode: fn(&str) -> Result<T, String>,
}

impl<T> StatusChecker for AssistantRun<'_, T> {
    type Raw = String;
    type Payload = T;

    async fn check_status(&self, job_id: &JobId) -> Result<StatusCheck<String>, TransportError> {
        let handle = RunHandle::parse(job_id.as_str())?;
        let run = self.client.retrieve_run(&handle).await?;
        tracing::debug!(job_id = %job_id, status = %run.status, "Assistant run status");

        let check = match RemoteStatus::parse(&run.status) {
            RemoteStatus::Finished => {
                let reply = self.client.latest_reply(&handle.thread_id).await?;
                StatusCheck::Finished(reply.unwrap_or_default())
            }
            RemoteStatus::Failed => StatusCheck::Failed(
                run.failure_reason()
                    .or_else(|| Some(format!("run {}", run.status))),
            ),
            RemoteStatus::Unknown(raw) => StatusCheck::Unknown(raw),
            pending => StatusCheck::Pending(pending),
        };
        Ok(check)
    }

    fn decode(&self, raw: String) -> Result<T, String> {
        (self.decode)(&raw)
    }
}
