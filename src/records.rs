//! Episodes and characters as they live in the spreadsheet and as the
//! assistant describes them.
//!
//! Column headers and status labels are the Portuguese ones the production
//! team already uses in the sheet.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::openai::parse_reply_list;
use crate::sheets::Row;

/// Approval workflow status shared by episodes and characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    AwaitingApproval,
    Approved,
    Pending,
    Rejected,
    /// Characters only: an image job is outstanding.
    GeneratingImage,
}

impl ApprovalStatus {
    pub fn label(self) -> &'static str {
        match self {
            ApprovalStatus::AwaitingApproval => "Aguardando Aprovação",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Pending => "Pendente",
            ApprovalStatus::Rejected => "Rejected",
            ApprovalStatus::GeneratingImage => "Gerando imagem",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        [
            ApprovalStatus::AwaitingApproval,
            ApprovalStatus::Approved,
            ApprovalStatus::Pending,
            ApprovalStatus::Rejected,
            ApprovalStatus::GeneratingImage,
        ]
        .into_iter()
        .find(|status| status.label() == label.trim())
    }

    /// Episode sheet value; anything unrecognized is still awaiting approval.
    pub fn parse_episode(label: &str) -> Self {
        match Self::from_label(label) {
            Some(ApprovalStatus::GeneratingImage) | None => ApprovalStatus::AwaitingApproval,
            Some(status) => status,
        }
    }

    /// Character sheet value; anything unrecognized is pending.
    pub fn parse_character(label: &str) -> Self {
        match Self::from_label(label) {
            None => ApprovalStatus::Pending,
            Some(status) => status,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Column headers of the episodes sheet, in order.
pub const EPISODE_COLUMNS: [&str; 4] = ["Episódio", "Descrição Curta", "Moral", "Status"];

/// Column headers of the characters sheet, in order.
pub const CHARACTER_COLUMNS: [&str; 5] = ["Nome", "Papel", "Descrição", "Status", "Link Imagem"];

pub const STATUS_COLUMN: &str = "Status";
pub const IMAGE_COLUMN: &str = "Link Imagem";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub description: String,
    pub moral: String,
    pub status: ApprovalStatus,
}

impl Episode {
    pub fn from_row(row: &Row) -> Self {
        Self {
            title: row.get("Episódio").to_string(),
            description: row.get("Descrição Curta").to_string(),
            moral: row.get("Moral").to_string(),
            status: ApprovalStatus::parse_episode(row.get(STATUS_COLUMN)),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.description.clone(),
            self.moral.clone(),
            self.status.label().to_string(),
        ]
    }

    /// Instruction asking the assistant for `count` new episode ideas.
    pub fn generation_prompt(count: u32) -> String {
        format!("Gere {count} ideias de episódios bíblicos infantis")
    }

    /// Decodes the assistant's reply into new episodes awaiting approval.
    pub fn decode_reply(text: &str) -> Result<Vec<Episode>, String> {
        let ideas: Vec<EpisodeIdea> = parse_reply_list(text)?;
        ideas
            .into_iter()
            .enumerate()
            .map(|(i, idea)| {
                if idea.title.trim().is_empty() {
                    return Err(format!("episode {} has no title", i + 1));
                }
                Ok(Episode {
                    title: idea.title.trim().to_string(),
                    description: idea.description.trim().to_string(),
                    moral: idea.moral.trim().to_string(),
                    status: ApprovalStatus::AwaitingApproval,
                })
            })
            .collect()
    }
}

/// Episode as the assistant writes it.
#[derive(Debug, Deserialize)]
struct EpisodeIdea {
    #[serde(rename = "episodio", alias = "titulo", alias = "title")]
    title: String,
    #[serde(default, rename = "descricao", alias = "description")]
    description: String,
    #[serde(default)]
    moral: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub role: String,
    pub description: String,
    pub status: ApprovalStatus,
    pub image_url: Option<String>,
}

impl Character {
    pub fn from_row(row: &Row) -> Self {
        let image_url = row.get(IMAGE_COLUMN).trim();
        Self {
            name: row.get("Nome").to_string(),
            role: row.get("Papel").to_string(),
            description: row.get("Descrição").to_string(),
            status: ApprovalStatus::parse_character(row.get(STATUS_COLUMN)),
            image_url: image_url
                .starts_with("http")
                .then(|| image_url.to_string()),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.role.clone(),
            self.description.clone(),
            self.status.label().to_string(),
            self.image_url.clone().unwrap_or_default(),
        ]
    }

    /// Instruction asking the assistant to cast an approved episode.
    pub fn generation_prompt(episode: &Episode) -> String {
        format!(
            "Descreva os personagens visuais do episódio \"{}\" ({}). \
             Responda apenas com JSON: uma lista de objetos com os campos \
             \"nome\", \"papel\" e \"descricao\" (aparência física, roupas e cores).",
            episode.title, episode.description
        )
    }

    /// Decodes the assistant's reply into new pending characters.
    pub fn decode_reply(text: &str) -> Result<Vec<Character>, String> {
        let ideas: Vec<CharacterIdea> = parse_reply_list(text)?;
        ideas
            .into_iter()
            .enumerate()
            .map(|(i, idea)| {
                if idea.name.trim().is_empty() {
                    return Err(format!("character {} has no name", i + 1));
                }
                Ok(Character {
                    name: idea.name.trim().to_string(),
                    role: idea.role.trim().to_string(),
                    description: idea.description.trim().to_string(),
                    status: ApprovalStatus::Pending,
                    image_url: None,
                })
            })
            .collect()
    }

    /// Prompt for the image service, with the reviewer's correction notes appended.
    pub fn image_prompt(&self, notes: Option<&str>) -> String {
        let mut prompt = format!(
            "Ilustração infantil em estilo de animação bíblica, cores suaves, fundo simples. \
             Personagem: {}, {}. {}",
            self.name, self.role, self.description
        );
        if let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) {
            prompt.push_str(" Correções: ");
            prompt.push_str(notes);
        }
        prompt
    }
}

/// Character as the assistant writes it.
#[derive(Debug, Deserialize)]
struct CharacterIdea {
    #[serde(rename = "nome", alias = "name")]
    name: String,
    #[serde(default, rename = "papel", alias = "role")]
    role: String,
    #[serde(default, rename = "descricao", alias = "description")]
    description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(columns: &[&str], cells: &[&str]) -> Row {
        let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        Row::from_cells(&header, &cells)
    }

    #[test]
    fn status_labels_roundtrip() {
        for status in [
            ApprovalStatus::AwaitingApproval,
            ApprovalStatus::Approved,
            ApprovalStatus::Pending,
            ApprovalStatus::Rejected,
        ] {
            assert_eq!(ApprovalStatus::parse_episode(status.label()), status);
        }
        assert_eq!(
            ApprovalStatus::parse_character("Gerando imagem"),
            ApprovalStatus::GeneratingImage
        );
    }

    #[test]
    fn unknown_labels_fall_back_per_table() {
        assert_eq!(ApprovalStatus::parse_episode("???"), ApprovalStatus::AwaitingApproval);
        assert_eq!(ApprovalStatus::parse_episode(""), ApprovalStatus::AwaitingApproval);
        assert_eq!(ApprovalStatus::parse_character("???"), ApprovalStatus::Pending);
        assert_eq!(
            ApprovalStatus::parse_character("Aguardando Aprovação"),
            ApprovalStatus::AwaitingApproval
        );
    }

    #[test]
    fn episode_from_row_and_back() {
        let row = row(
            &EPISODE_COLUMNS,
            &["A Arca de Noé", "Noé constrói a arca", "Obediência", "Approved"],
        );
        let episode = Episode::from_row(&row);
        assert_eq!(episode.title, "A Arca de Noé");
        assert_eq!(episode.status, ApprovalStatus::Approved);
        assert_eq!(
            episode.to_cells(),
            vec!["A Arca de Noé", "Noé constrói a arca", "Obediência", "Approved"]
        );
    }

    #[test]
    fn episode_prompt_matches_series_wording() {
        assert_eq!(
            Episode::generation_prompt(3),
            "Gere 3 ideias de episódios bíblicos infantis"
        );
    }

    #[test]
    fn decode_episode_list() {
        let reply = r#"[
            {"episodio": "Davi e Golias", "descricao": "Um jovem pastor enfrenta um gigante", "moral": "Coragem"},
            {"episodio": " Jonas ", "descricao": "O grande peixe", "moral": "Obediência"}
        ]"#;
        let episodes = Episode::decode_reply(reply).unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[1].title, "Jonas");
        assert!(episodes.iter().all(|e| e.status == ApprovalStatus::AwaitingApproval));
    }

    #[test]
    fn decode_single_episode_object() {
        let episodes =
            Episode::decode_reply(r#"{"episodio": "Daniel na cova", "moral": "Fé"}"#).unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].description, "");
    }

    #[test]
    fn decode_rejects_blank_title() {
        let err = Episode::decode_reply(r#"[{"episodio": "  ", "moral": "x"}]"#).unwrap_err();
        assert_eq!(err, "episode 1 has no title");
        assert!(Episode::decode_reply("não sei").is_err());
    }

    #[test]
    fn character_from_row_keeps_only_http_links() {
        let with_link = row(
            &CHARACTER_COLUMNS,
            &["Noé", "Construtor", "Barba branca", "Approved", "https://cdn.example/noe.png"],
        );
        assert_eq!(
            Character::from_row(&with_link).image_url.as_deref(),
            Some("https://cdn.example/noe.png")
        );

        let without = row(&CHARACTER_COLUMNS, &["Noé", "Construtor", "Barba branca", "", "pendente"]);
        let character = Character::from_row(&without);
        assert!(character.image_url.is_none());
        assert_eq!(character.status, ApprovalStatus::Pending);
    }

    #[test]
    fn decode_characters_accepts_english_keys() {
        let reply = r#"[{"name": "Golias", "role": "Gigante", "description": "Armadura de bronze"}]"#;
        let characters = Character::decode_reply(reply).unwrap();
        assert_eq!(characters[0].name, "Golias");
        assert_eq!(characters[0].status, ApprovalStatus::Pending);
        assert_eq!(characters[0].to_cells()[4], "");
    }

    #[test]
    fn image_prompt_appends_notes() {
        let character = Character {
            name: "Davi".into(),
            role: "Pastor".into(),
            description: "Menino de cabelo cacheado".into(),
            status: ApprovalStatus::Rejected,
            image_url: None,
        };
        let plain = character.image_prompt(None);
        assert!(plain.contains("Davi, Pastor. Menino de cabelo cacheado"));
        assert!(!plain.contains("Correções"));

        let corrected = character.image_prompt(Some("  sem barba "));
        assert!(corrected.ends_with("Correções: sem barba"));
        assert_eq!(character.image_prompt(Some("   ")), plain);
    }
}
