//! Tipos de erro para o cliente da API de Assistants da OpenAI.
//!
//! Define [`OpenAiError`] com variantes para rate limiting, erros da API,
//! erros de rede e handles de execução inválidos. As conversões para
//! [`SubmissionError`] e [`TransportError`] ligam o cliente ao poller.

use thiserror::Error;

use crate::http::HttpFailure;
use crate::poller::{SubmissionError, TransportError};

/// Erros que podem ocorrer ao interagir com a API da OpenAI.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// O servidor retornou HTTP 429 (rate limit).
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Erro retornado pela API (ex.: 401 chave inválida, 404 thread inexistente).
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// O job id não tem o formato `thread_id/run_id`.
    #[error("invalid run handle: {0:?}")]
    InvalidHandle(String),
}

impl From<HttpFailure> for OpenAiError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::RateLimited { retry_after_ms } => OpenAiError::RateLimited { retry_after_ms },
            HttpFailure::Status { status, message } => OpenAiError::ApiError { status, message },
            HttpFailure::Network(err) => OpenAiError::NetworkError(err),
        }
    }
}

impl From<OpenAiError> for SubmissionError {
    fn from(err: OpenAiError) -> Self {
        SubmissionError::new(err.to_string())
    }
}

impl From<OpenAiError> for TransportError {
    fn from(err: OpenAiError) -> Self {
        TransportError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_display() {
        let err = OpenAiError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
    }

    #[test]
    fn api_error_display() {
        let err = OpenAiError::ApiError {
            status: 401,
            message: "Incorrect API key provided".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error (status 401): Incorrect API key provided"
        );
    }

    #[test]
    fn converts_to_transport_error() {
        let err: TransportError = OpenAiError::InvalidHandle("run_1".into()).into();
        assert_eq!(err.message, "invalid run handle: \"run_1\"");
    }
}
