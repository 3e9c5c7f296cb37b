use thiserror::Error;

use crate::http::HttpFailure;
use crate::poller::{SubmissionError, TransportError};

/// Errors returned by the image-generation API client.
#[derive(Debug, Error)]
pub enum ImageApiError {
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl From<HttpFailure> for ImageApiError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::RateLimited { retry_after_ms } => ImageApiError::RateLimited { retry_after_ms },
            HttpFailure::Status { status, message } => ImageApiError::ApiError { status, message },
            HttpFailure::Network(err) => ImageApiError::NetworkError(err),
        }
    }
}

impl From<ImageApiError> for SubmissionError {
    fn from(err: ImageApiError) -> Self {
        SubmissionError::new(err.to_string())
    }
}

impl From<ImageApiError> for TransportError {
    fn from(err: ImageApiError) -> Self {
        TransportError::new(err.to_string())
    }
}
