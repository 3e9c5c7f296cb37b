use thiserror::Error;

use crate::image::ImageApiError;
use crate::openai::OpenAiError;
use crate::poller::{PollError, SubmissionError};
use crate::sheets::SheetsError;

#[derive(Debug, Error)]
pub enum TendaError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Row {row} not found in {table}")]
    RowNotFound { table: String, row: usize },

    #[error("Could not start generation: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Generation did not complete: {0}")]
    Poll(#[from] PollError),

    #[error("OpenAI API error: {0}")]
    OpenAi(#[from] OpenAiError),

    #[error("Image API error: {0}")]
    Image(#[from] ImageApiError),

    #[error("Spreadsheet error: {0}")]
    Sheets(#[from] SheetsError),
}
