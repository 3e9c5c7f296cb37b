//! HTTP client for the hosted image-generation API.
//!
//! Jobs are created with `POST {base}/generations` and observed with
//! `GET {base}/generations/{id}`. The client implements both halves of the
//! poller contract: [`JobSubmitter`] to create a job and [`StatusChecker`] to
//! watch it.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::error::ImageApiError;
use super::types::{GeneratedImage, GenerationCreated, GenerationRequest, GenerationStatus};
use crate::config::ImageConfig;
use crate::http;
use crate::poller::{
    JobId, JobSubmitter, RemoteStatus, StatusCheck, StatusChecker, SubmissionError, TransportError,
};

pub struct ImageClient {
    api_key: String,
    base_url: String,
    model: String,
    width: u32,
    height: u32,
    client: Client,
}

impl ImageClient {
    pub fn new(config: &ImageConfig) -> Result<Self, ImageApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            width: config.width,
            height: config.height,
            client,
        })
    }

    pub async fn generation(&self, id: &str) -> Result<GenerationStatus, ImageApiError> {
        let url = format!("{}/generations/{id}", self.base_url);
        self.send(self.client.get(url)).await
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, ImageApiError> {
        Ok(http::send_json(request.bearer_auth(&self.api_key)).await?)
    }
}

impl JobSubmitter for ImageClient {
    type Request = str;

    async fn submit(&self, prompt: &str) -> Result<JobId, SubmissionError> {
        if prompt.trim().is_empty() {
            return Err(SubmissionError::new("image prompt is empty"));
        }
        let body = GenerationRequest {
            prompt: prompt.to_string(),
            model: self.model.clone(),
            width: self.width,
            height: self.height,
        };
        let created: GenerationCreated = self
            .send(
                self.client
                    .post(format!("{}/generations", self.base_url))
                    .json(&body),
            )
            .await?;
        tracing::info!(job_id = %created.id, model = %self.model, "Image generation submitted");
        JobId::new(created.id)
    }
}

impl StatusChecker for ImageClient {
    type Raw = GenerationStatus;
    type Payload = GeneratedImage;

    async fn check_status(
        &self,
        job_id: &JobId,
    ) -> Result<StatusCheck<GenerationStatus>, TransportError> {
        let generation = self.generation(job_id.as_str()).await?;
        tracing::debug!(job_id = %job_id, status = %generation.status, "Image generation status");

        let check = match RemoteStatus::parse(&generation.status) {
            RemoteStatus::Finished => StatusCheck::Finished(generation),
            RemoteStatus::Failed => StatusCheck::Failed(
                generation
                    .error
                    .clone()
                    .or_else(|| Some(format!("generation {}", generation.status))),
            ),
            RemoteStatus::Unknown(raw) => StatusCheck::Unknown(raw),
            pending => StatusCheck::Pending(pending),
        };
        Ok(check)
    }

    fn decode(&self, raw: GenerationStatus) -> Result<GeneratedImage, String> {
        raw.first_url()
            .map(|url| GeneratedImage {
                url: url.to_string(),
            })
            .ok_or_else(|| format!("generation {} finished without an image URL", raw.id))
    }
}
