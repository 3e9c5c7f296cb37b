use thiserror::Error;

use crate::http::HttpFailure;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("column {column:?} not found in {table}")]
    MissingColumn { table: String, column: String },

    #[error("invalid spreadsheet URL: {0}")]
    InvalidUrl(String),
}

impl From<HttpFailure> for SheetsError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::RateLimited { retry_after_ms } => SheetsError::RateLimited { retry_after_ms },
            HttpFailure::Status { status, message } => SheetsError::ApiError { status, message },
            HttpFailure::Network(err) => SheetsError::NetworkError(err),
        }
    }
}
