//! JSON round trip shared by the assistant, image and spreadsheet clients.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Why a round trip failed, before each client maps it onto its own error type.
#[derive(Debug)]
pub enum HttpFailure {
    /// HTTP 429, with the server's `retry-after` converted to milliseconds.
    RateLimited { retry_after_ms: u64 },
    /// Any other non-2xx status, with the response body as message.
    Status { status: u16, message: String },
    Network(reqwest::Error),
}

impl From<reqwest::Error> for HttpFailure {
    fn from(err: reqwest::Error) -> Self {
        HttpFailure::Network(err)
    }
}

/// Sends an authorized request and decodes a successful body as `R`.
pub async fn send_json<R: DeserializeOwned>(request: RequestBuilder) -> Result<R, HttpFailure> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(|secs| secs * 1000)
            .unwrap_or(1000);
        return Err(HttpFailure::RateLimited {
            retry_after_ms: retry_after,
        });
    }

    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(HttpFailure::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<R>().await?)
}
