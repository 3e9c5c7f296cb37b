//! Configuração do Tenda carregada a partir de `tenda.toml`.
//!
//! A struct [`TendaConfig`] reúne os parâmetros de todos os clientes
//! (assistente, imagens, planilha) e do poller. Valores ausentes no arquivo
//! usam defaults. Variáveis de ambiente (também lidas de `.env`) têm
//! precedência sobre o arquivo para segredos e identificadores.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::error::TendaError;
use crate::poller::PollConfig;

/// Configuração de nível superior carregada de `tenda.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TendaConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Cadência de polling para execuções do assistente.
    #[serde(default = "default_text_poll")]
    pub text_poll: PollSection,

    /// Cadência de polling para jobs de imagem.
    #[serde(default = "default_image_poll")]
    pub image_poll: PollSection,
}

/// Acesso à API de Assistants da OpenAI.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Assistente previamente configurado com o prompt da série.
    #[serde(default)]
    pub assistant_id: String,
}

/// Acesso à API de geração de imagens.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_image_base_url")]
    pub base_url: String,

    #[serde(default = "default_image_model")]
    pub model: String,

    #[serde(default = "default_image_side")]
    pub width: u32,

    #[serde(default = "default_image_side")]
    pub height: u32,
}

/// Acesso à planilha Google Sheets que guarda episódios e personagens.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Token OAuth de acesso (bearer).
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub spreadsheet_id: String,

    #[serde(default = "default_episodes_table")]
    pub episodes_table: String,

    #[serde(default = "default_characters_table")]
    pub characters_table: String,
}

/// Intervalo entre consultas e orçamento total de espera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PollSection {
    pub interval_ms: u64,
    pub max_wait_secs: u64,
}

impl PollSection {
    pub fn to_poll_config(self) -> PollConfig {
        PollConfig::new(
            Duration::from_millis(self.interval_ms),
            Duration::from_secs(self.max_wait_secs),
        )
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_image_base_url() -> String {
    "https://cloud.leonardo.ai/api/rest/v1".to_string()
}

fn default_image_model() -> String {
    "phoenix".to_string()
}

fn default_image_side() -> u32 {
    1024
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_episodes_table() -> String {
    "Episodios".to_string()
}

fn default_characters_table() -> String {
    "Personagens".to_string()
}

// Assistente: consulta a cada 1s, desiste após 300s.
fn default_text_poll() -> PollSection {
    PollSection {
        interval_ms: 1_000,
        max_wait_secs: 300,
    }
}

// Imagens: consulta a cada 10s, mesmo orçamento de 300s.
fn default_image_poll() -> PollSection {
    PollSection {
        interval_ms: 10_000,
        max_wait_secs: 300,
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            assistant_id: String::new(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_image_base_url(),
            model: default_image_model(),
            width: default_image_side(),
            height: default_image_side(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: default_sheets_base_url(),
            spreadsheet_id: String::new(),
            episodes_table: default_episodes_table(),
            characters_table: default_characters_table(),
        }
    }
}

impl Default for TendaConfig {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig::default(),
            image: ImageConfig::default(),
            sheets: SheetsConfig::default(),
            text_poll: default_text_poll(),
            image_poll: default_image_poll(),
        }
    }
}

impl TendaConfig {
    /// Carrega `tenda.toml` do diretório atual, aplicando `.env` e variáveis de ambiente.
    pub fn load() -> Result<Self> {
        // `.env` é opcional.
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new("tenda.toml"))
    }

    /// Carrega a configuração de um caminho explícito. Arquivo ausente significa defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<TendaConfig>(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Sobrescreve segredos e identificadores com valores não vazios do ambiente.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let targets: [(&str, &mut String); 5] = [
            ("OPENAI_API_KEY", &mut self.openai.api_key),
            ("TENDA_ASSISTANT_ID", &mut self.openai.assistant_id),
            ("IMAGE_API_KEY", &mut self.image.api_key),
            ("GOOGLE_SHEETS_TOKEN", &mut self.sheets.access_token),
            ("TENDA_SPREADSHEET_ID", &mut self.sheets.spreadsheet_id),
        ];
        for (name, field) in targets {
            if let Some(value) = lookup(name)
                && !value.is_empty()
            {
                *field = value;
            }
        }
    }

    /// Rejeita cadências que fariam o poller girar sem pausa.
    pub fn validate(&self) -> Result<(), TendaError> {
        for (name, section) in [("text_poll", self.text_poll), ("image_poll", self.image_poll)] {
            if section.interval_ms == 0 {
                return Err(TendaError::Config(format!("{name}.interval_ms must be greater than zero")));
            }
        }
        Ok(())
    }

    /// Aplica os overrides da linha de comando às duas seções de polling.
    pub fn override_polling(&mut self, interval_ms: Option<u64>, max_wait_secs: Option<u64>) {
        for section in [&mut self.text_poll, &mut self.image_poll] {
            if let Some(interval_ms) = interval_ms {
                section.interval_ms = interval_ms;
            }
            if let Some(max_wait_secs) = max_wait_secs {
                section.max_wait_secs = max_wait_secs;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_values() {
        let config = TendaConfig::default();
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.sheets.episodes_table, "Episodios");
        assert_eq!(config.sheets.characters_table, "Personagens");
        assert_eq!(config.text_poll.interval_ms, 1_000);
        assert_eq!(config.image.width, 1024);
        assert!(config.openai.api_key.is_empty());
    }

    #[test]
    fn missing_sections_get_their_own_defaults() {
        let config: TendaConfig = toml::from_str("").unwrap();
        assert_eq!(config.text_poll, PollSection { interval_ms: 1_000, max_wait_secs: 300 });
        assert_eq!(config.image_poll, PollSection { interval_ms: 10_000, max_wait_secs: 300 });
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            [openai]
            assistant_id = "asst_123"

            [image_poll]
            interval_ms = 5000
            max_wait_secs = 120
        "#;
        let config: TendaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.openai.assistant_id, "asst_123");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(
            config.image_poll.to_poll_config(),
            PollConfig::new(Duration::from_secs(5), Duration::from_secs(120))
        );
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = TendaConfig::default();
        config.openai.api_key = "from-file".into();
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-env"),
            ("GOOGLE_SHEETS_TOKEN", "ya29.token"),
            ("IMAGE_API_KEY", ""),
        ]);
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.openai.api_key, "sk-env");
        assert_eq!(config.sheets.access_token, "ya29.token");
        assert!(config.image.api_key.is_empty());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[sheets]\nspreadsheet_id = \"sheet-1\"\nepisodes_table = \"Eps\"\n"
        )
        .unwrap();
        let config = TendaConfig::load_from(file.path()).unwrap();
        assert_eq!(config.sheets.episodes_table, "Eps");
        assert_eq!(config.sheets.characters_table, "Personagens");
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TendaConfig::load_from(&dir.path().join("tenda.toml")).unwrap();
        assert_eq!(config.image_poll.interval_ms, 10_000);
    }

    #[test]
    fn invalid_toml_keeps_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[image]\nwidth = \"large\"\n").unwrap();
        let err = TendaConfig::load_from(file.path()).unwrap_err();
        assert!(err.downcast_ref::<toml::de::Error>().is_some());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[text_poll]\ninterval_ms = 0\nmax_wait_secs = 10\n").unwrap();
        let err = TendaConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("text_poll.interval_ms"));
    }

    #[test]
    fn cli_overrides_apply_to_both_sections() {
        let mut config = TendaConfig::default();
        config.override_polling(Some(250), None);
        assert_eq!(config.text_poll.interval_ms, 250);
        assert_eq!(config.image_poll.interval_ms, 250);
        assert_eq!(config.image_poll.max_wait_secs, 300);
    }
}
