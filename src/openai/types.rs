//! Tipos de dados para o subconjunto da API de Assistants v2 usado aqui:
//! threads, mensagens e execuções (runs).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::OpenAiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// Corpo de `POST /threads/{thread_id}/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessage {
    /// Papel do remetente; sempre "user" neste sistema.
    pub role: String,
    pub content: String,
}

/// Corpo de `POST /threads/{thread_id}/runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRun {
    pub assistant_id: String,
}

/// Uma execução do assistente sobre uma thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    /// Status bruto (ex.: "queued", "in_progress", "completed", "expired").
    pub status: String,
    #[serde(default)]
    pub last_error: Option<RunError>,
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
}

impl Run {
    /// Motivo de falha informado pelo serviço, se houver.
    pub fn failure_reason(&self) -> Option<String> {
        self.last_error
            .as_ref()
            .map(|e| format!("{}: {}", e.code, e.message))
            .or_else(|| {
                self.incomplete_details
                    .as_ref()
                    .map(|d| format!("incomplete: {}", d.reason))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncompleteDetails {
    pub reason: String,
}

/// Resposta de `GET /threads/{thread_id}/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageList {
    pub data: Vec<ThreadMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl ThreadMessage {
    /// Texto do primeiro bloco do tipo "text".
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|block| block.content_type == "text")
            .and_then(|block| block.text.as_ref())
            .map(|text| text.value.as_str())
    }
}

/// Um bloco de conteúdo. O campo `content_type` é serializado como `"type"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
}

/// Identifica uma execução: a thread e o run dentro dela.
///
/// Serializado como `thread_id/run_id`, que é o job id opaco visto pelo poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub thread_id: String,
    pub run_id: String,
}

impl RunHandle {
    pub fn parse(raw: &str) -> Result<Self, OpenAiError> {
        match raw.split_once('/') {
            Some((thread_id, run_id))
                if !thread_id.is_empty() && !run_id.is_empty() && !run_id.contains('/') =>
            {
                Ok(Self {
                    thread_id: thread_id.to_string(),
                    run_id: run_id.to_string(),
                })
            }
            _ => Err(OpenAiError::InvalidHandle(raw.to_string())),
        }
    }
}

impl fmt::Display for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.thread_id, self.run_id)
    }
}
