//! Production workflow over the spreadsheet: episode ideas, their cast and
//! character artwork.
//!
//! Every generation step is an explicit call. Approving an episode only
//! writes its status cell; casting it is a separate [`Studio::generate_characters`].

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::config::TendaConfig;
use crate::error::TendaError;
use crate::image::{GeneratedImage, ImageClient};
use crate::openai::OpenAiClient;
use crate::poller::{Job, JobId, JobKind, JobSubmitter, await_completion, await_job};
use crate::records::{ApprovalStatus, Character, Episode, IMAGE_COLUMN, STATUS_COLUMN};
use crate::sheets::{RowStore, SheetsClient};

/// Largest batch of episode ideas requested in one run.
pub const MAX_EPISODES_PER_RUN: u32 = 10;

/// Counters shown on the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub episodes: usize,
    pub approved_episodes: usize,
    pub characters: usize,
    pub approved_characters: usize,
}

/// What happened to one character row during an image run.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    /// Zero-based data row in the characters table.
    pub row: usize,
    pub character: String,
    /// `None` when the job could not even be submitted.
    pub job_id: Option<JobId>,
    /// Image URL on success, failure description otherwise.
    pub result: Result<String, String>,
}

pub struct Studio<S> {
    config: TendaConfig,
    assistant: OpenAiClient,
    images: ImageClient,
    store: S,
}

impl Studio<SheetsClient> {
    /// Studio backed by the configured Google spreadsheet.
    pub fn connect(config: TendaConfig) -> Result<Self, TendaError> {
        let store = SheetsClient::new(&config.sheets)?;
        Self::new(config, store)
    }
}

impl<S: RowStore> Studio<S> {
    pub fn new(config: TendaConfig, store: S) -> Result<Self, TendaError> {
        let assistant = OpenAiClient::new(&config.openai)?;
        let images = ImageClient::new(&config.image)?;
        Ok(Self {
            config,
            assistant,
            images,
            store,
        })
    }

    pub fn config(&self) -> &TendaConfig {
        &self.config
    }

    fn episodes_table(&self) -> &str {
        &self.config.sheets.episodes_table
    }

    fn characters_table(&self) -> &str {
        &self.config.sheets.characters_table
    }

    pub async fn list_episodes(&self) -> Result<Vec<Episode>, TendaError> {
        let rows = self.store.read_all(self.episodes_table()).await?;
        Ok(rows.iter().map(Episode::from_row).collect())
    }

    pub async fn list_characters(&self) -> Result<Vec<Character>, TendaError> {
        let rows = self.store.read_all(self.characters_table()).await?;
        Ok(rows.iter().map(Character::from_row).collect())
    }

    /// Episodes cleared for production, shown on the scenes tab.
    pub async fn approved_episodes(&self) -> Result<Vec<Episode>, TendaError> {
        let mut episodes = self.list_episodes().await?;
        episodes.retain(|e| e.status == ApprovalStatus::Approved);
        Ok(episodes)
    }

    pub async fn summary(&self) -> Result<Summary, TendaError> {
        let episodes = self.list_episodes().await?;
        let characters = self.list_characters().await?;
        Ok(Summary {
            episodes: episodes.len(),
            approved_episodes: episodes
                .iter()
                .filter(|e| e.status == ApprovalStatus::Approved)
                .count(),
            characters: characters.len(),
            approved_characters: characters
                .iter()
                .filter(|c| c.status == ApprovalStatus::Approved)
                .count(),
        })
    }

    /// Asks the assistant for `count` new episodes and appends them, awaiting approval.
    ///
    /// Nothing is written unless the whole reply decodes.
    pub async fn generate_episodes(
        &self,
        count: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Episode>, TendaError> {
        if !(1..=MAX_EPISODES_PER_RUN).contains(&count) {
            return Err(TendaError::InvalidRequest(format!(
                "episode count must be between 1 and {MAX_EPISODES_PER_RUN}, got {count}"
            )));
        }

        let episodes = self
            .ask_assistant(&Episode::generation_prompt(count), Episode::decode_reply, cancel)
            .await?;
        for episode in &episodes {
            self.store
                .append_row(self.episodes_table(), &episode.to_cells())
                .await?;
        }
        tracing::info!(count = episodes.len(), "Episodes added");
        Ok(episodes)
    }

    /// Writes the approval status of one episode. No generation is started.
    pub async fn set_episode_status(
        &self,
        row: usize,
        status: ApprovalStatus,
    ) -> Result<Episode, TendaError> {
        if status == ApprovalStatus::GeneratingImage {
            return Err(TendaError::InvalidRequest(format!(
                "\"{status}\" only applies to characters"
            )));
        }
        let mut episode = self.episode_at(row).await?;
        self.store
            .update_cell(self.episodes_table(), row, STATUS_COLUMN, status.label())
            .await?;
        tracing::info!(row, title = %episode.title, %status, "Episode status updated");
        episode.status = status;
        Ok(episode)
    }

    /// Asks the assistant to cast an approved episode and appends the
    /// characters as pending.
    pub async fn generate_characters(
        &self,
        episode_row: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Character>, TendaError> {
        let episode = self.episode_at(episode_row).await?;
        if episode.status != ApprovalStatus::Approved {
            return Err(TendaError::InvalidRequest(format!(
                "episode \"{}\" is not approved (status: {})",
                episode.title, episode.status
            )));
        }

        let characters = self
            .ask_assistant(&Character::generation_prompt(&episode), Character::decode_reply, cancel)
            .await?;
        for character in &characters {
            self.store
                .append_row(self.characters_table(), &character.to_cells())
                .await?;
        }
        tracing::info!(episode = %episode.title, count = characters.len(), "Characters added");
        Ok(characters)
    }

    /// Generates artwork for the given character rows.
    ///
    /// Rows are marked "Gerando imagem" and submitted one by one, then every
    /// job is awaited concurrently. A finished job writes its link and moves
    /// the character to awaiting approval; any other outcome puts it back to
    /// pending. One failure never aborts the other rows: rejected
    /// submissions and failed sheet writes are reported on their own row.
    pub async fn render_character_images(
        &self,
        rows: &[usize],
        notes: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RenderOutcome>, TendaError> {
        if rows.is_empty() {
            return Err(TendaError::InvalidRequest("no character rows given".into()));
        }
        let table = self.characters_table();
        let characters = self.list_characters().await?;

        let mut targets: Vec<(usize, &Character)> = Vec::with_capacity(rows.len());
        for &row in rows {
            let character = characters.get(row).ok_or_else(|| TendaError::RowNotFound {
                table: table.to_string(),
                row,
            })?;
            if !targets.iter().any(|(seen, _)| *seen == row) {
                targets.push((row, character));
            }
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        let mut pending: Vec<(usize, &Character, Job<GeneratedImage>)> = Vec::new();
        for (row, character) in targets {
            if let Err(reason) = self.set_character_status(row, ApprovalStatus::GeneratingImage).await {
                outcomes.push(RenderOutcome {
                    row,
                    character: character.name.clone(),
                    job_id: None,
                    result: Err(reason),
                });
                continue;
            }
            match self.images.submit(&character.image_prompt(notes)).await {
                Ok(job_id) => {
                    pending.push((row, character, Job::submitted(job_id, JobKind::ImageGeneration)));
                }
                Err(err) => {
                    tracing::warn!(row, character = %character.name, error = %err, "Image job not submitted");
                    outcomes.push(RenderOutcome {
                        row,
                        character: character.name.clone(),
                        job_id: None,
                        result: Err(self.release(row, err.to_string()).await),
                    });
                }
            }
        }

        let poll = self.config.image_poll.to_poll_config();
        let waits = pending
            .iter_mut()
            .map(|(_, _, job)| await_job(job, &self.images, &poll, cancel));
        for result in join_all(waits).await {
            if let Err(err) = result {
                tracing::warn!(error = %err, "Image job was not awaited");
            }
        }

        for (row, character, job) in pending {
            tracing::debug!(
                job_id = %job.job_id,
                kind = %job.kind,
                state = ?job.state(),
                submitted_at = %job.submitted_at,
                "Image job settled"
            );
            let job_id = job.job_id.clone();
            let result = match job.into_outcome() {
                Ok(image) => self.record_image(row, &image).await,
                Err(reason) => Err(self.release(row, reason).await),
            };
            outcomes.push(RenderOutcome {
                row,
                character: character.name.clone(),
                job_id: Some(job_id),
                result,
            });
        }

        outcomes.sort_by_key(|o| o.row);
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!(rendered = outcomes.len() - failed, failed, "Image run finished");
        Ok(outcomes)
    }

    /// Stores a finished image. A failed write is reported on the row
    /// instead of aborting the run.
    async fn record_image(&self, row: usize, image: &GeneratedImage) -> Result<String, String> {
        let table = self.characters_table();
        let written = async {
            self.store.update_cell(table, row, IMAGE_COLUMN, &image.url).await?;
            self.store
                .update_cell(table, row, STATUS_COLUMN, ApprovalStatus::AwaitingApproval.label())
                .await
        }
        .await;
        match written {
            Ok(()) => Ok(image.url.clone()),
            Err(err) => {
                tracing::warn!(row, url = %image.url, error = %err, "Image link not saved");
                Err(format!("image ready at {} but the sheet update failed: {err}", image.url))
            }
        }
    }

    /// Puts a row whose image failed back to pending, returning `reason`
    /// extended with the write error when that also fails.
    async fn release(&self, row: usize, reason: String) -> String {
        match self.set_character_status(row, ApprovalStatus::Pending).await {
            Ok(()) => reason,
            Err(write) => format!("{reason}; {write}"),
        }
    }

    async fn set_character_status(&self, row: usize, status: ApprovalStatus) -> Result<(), String> {
        self.store
            .update_cell(self.characters_table(), row, STATUS_COLUMN, status.label())
            .await
            .map_err(|err| {
                tracing::warn!(row, %status, error = %err, "Character status not saved");
                format!("could not set status \"{status}\": {err}")
            })
    }

    async fn episode_at(&self, row: usize) -> Result<Episode, TendaError> {
        let table = self.episodes_table();
        self.store
            .read_all(table)
            .await?
            .get(row)
            .map(Episode::from_row)
            .ok_or_else(|| TendaError::RowNotFound {
                table: table.to_string(),
                row,
            })
    }

    async fn ask_assistant<T>(
        &self,
        prompt: &str,
        decode: fn(&str) -> Result<T, String>,
        cancel: &CancellationToken,
    ) -> Result<T, TendaError> {
        let job_id = self.assistant.submit(prompt).await?;
        let poll = self.config.text_poll.to_poll_config();
        let reply = await_completion(&job_id, &self.assistant.runs(decode), &poll, cancel).await?;
        Ok(reply)
    }
}
