//! Interface de terminal do Tenda: spinners e saída colorida.
//!
//! Usa `indicatif` para o spinner exibido enquanto um job remoto é aguardado
//! e `console` para colorir status e tabelas. Linhas são numeradas a partir
//! de 1 para casar com os argumentos da CLI.

use std::time::Duration;

use console::{Style, style};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::TendaError;
use crate::records::{ApprovalStatus, Character, Episode};
use crate::studio::{RenderOutcome, Summary};

/// Spinner exibido enquanto um job de geração está em andamento.
pub struct WaitSpinner {
    pb: ProgressBar,
    green: Style,
}

impl WaitSpinner {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Self {
            pb,
            green: Style::new().green().bold(),
        }
    }

    /// Encerra o spinner com uma mensagem de sucesso.
    pub fn finish_ok(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} {message}", self.green.apply_to("✓"));
    }

    /// Remove o spinner; o erro é impresso por quem chamou.
    pub fn finish_err(&self) {
        self.pb.finish_and_clear();
    }
}

/// Rótulo de status colorido: verde aprovado, vermelho rejeitado, amarelo em espera.
pub fn status_label(status: ApprovalStatus) -> String {
    let styled = match status {
        ApprovalStatus::Approved => style(status.label()).green(),
        ApprovalStatus::Rejected => style(status.label()).red(),
        ApprovalStatus::GeneratingImage => style(status.label()).cyan(),
        ApprovalStatus::AwaitingApproval | ApprovalStatus::Pending => {
            style(status.label()).yellow()
        }
    };
    styled.to_string()
}

fn episode_line(number: usize, episode: &Episode) -> String {
    format!(
        "{:>3}  {}  [{}]\n     {}\n     Moral: {}",
        number,
        style(&episode.title).bold(),
        status_label(episode.status),
        episode.description,
        episode.moral
    )
}

fn character_line(number: usize, character: &Character) -> String {
    let image = character
        .image_url
        .as_deref()
        .map(|url| style(url).underlined().to_string())
        .unwrap_or_else(|| style("sem imagem").dim().to_string());
    format!(
        "{:>3}  {} ({})  [{}]\n     {}\n     {}",
        number,
        style(&character.name).bold(),
        character.role,
        status_label(character.status),
        character.description,
        image
    )
}

pub fn print_episodes(episodes: &[Episode]) {
    if episodes.is_empty() {
        println!("{}", style("Nenhum episódio na planilha.").dim());
        return;
    }
    for (i, episode) in episodes.iter().enumerate() {
        println!("{}", episode_line(i + 1, episode));
    }
}

pub fn print_characters(characters: &[Character]) {
    if characters.is_empty() {
        println!("{}", style("Nenhum personagem na planilha.").dim());
        return;
    }
    for (i, character) in characters.iter().enumerate() {
        println!("{}", character_line(i + 1, character));
    }
}

pub fn print_summary(summary: &Summary) {
    println!("{}", style("─── Resumo ───").bold());
    println!(
        "  Episódios:   {} ({} aprovados)",
        summary.episodes, summary.approved_episodes
    );
    println!(
        "  Personagens: {} ({} aprovados)",
        summary.characters, summary.approved_characters
    );
}

fn outcome_line(outcome: &RenderOutcome) -> String {
    let job = outcome
        .job_id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    match &outcome.result {
        Ok(url) => format!(
            "  {} linha {} {}: {url} (job {job})",
            style("✓").green().bold(),
            outcome.row + 1,
            outcome.character
        ),
        Err(reason) => format!(
            "  {} linha {} {}: {reason}",
            style("✗").red().bold(),
            outcome.row + 1,
            outcome.character
        ),
    }
}

pub fn print_render_outcomes(outcomes: &[RenderOutcome]) {
    for outcome in outcomes {
        println!("{}", outcome_line(outcome));
    }
}

/// Descrição de um erro para o terminal. Falhas de espera trazem o job,
/// o último status visto e o tempo decorrido em linhas próprias.
pub fn describe_error(err: &TendaError) -> String {
    let mut text = format!("{} {err}", style("✗").red().bold());
    if let TendaError::Poll(poll) = err {
        text.push_str(&format!(
            "\n    job:           {}\n    último status: {}\n    decorrido:     {:.1?}",
            poll.job_id(),
            poll.last_status(),
            poll.elapsed()
        ));
        if poll.is_unresolved() {
            text.push_str("\n    o job pode ainda terminar no serviço remoto");
        }
    }
    text
}

pub fn print_error(err: &TendaError) {
    eprintln!("{}", describe_error(err));
}

#[cfg(test)]
mod tests {
    use console::strip_ansi_codes;

    use super::*;
    use crate::poller::{JobId, PollError, RemoteStatus};

    fn plain(text: &str) -> String {
        strip_ansi_codes(text).into_owned()
    }

    #[test]
    fn status_label_keeps_sheet_wording() {
        assert_eq!(plain(&status_label(ApprovalStatus::AwaitingApproval)), "Aguardando Aprovação");
        assert_eq!(plain(&status_label(ApprovalStatus::GeneratingImage)), "Gerando imagem");
    }

    #[test]
    fn episode_line_is_numbered_from_one() {
        let episode = Episode {
            title: "Jonas".into(),
            description: "O grande peixe".into(),
            moral: "Obediência".into(),
            status: ApprovalStatus::Approved,
        };
        let line = plain(&episode_line(1, &episode));
        assert!(line.starts_with("  1  Jonas  [Approved]"));
        assert!(line.contains("Moral: Obediência"));
    }

    #[test]
    fn character_line_marks_missing_image() {
        let character = Character {
            name: "Golias".into(),
            role: "Gigante".into(),
            description: "Armadura de bronze".into(),
            status: ApprovalStatus::Pending,
            image_url: None,
        };
        assert!(plain(&character_line(2, &character)).contains("sem imagem"));
    }

    #[test]
    fn failed_outcome_uses_display_row() {
        let outcome = RenderOutcome {
            row: 0,
            character: "Noé".into(),
            job_id: None,
            result: Err("submission failed: quota".into()),
        };
        assert_eq!(
            plain(&outcome_line(&outcome)),
            "  ✗ linha 1 Noé: submission failed: quota"
        );
    }

    #[test]
    fn poll_errors_show_job_status_and_elapsed() {
        let err = TendaError::Poll(PollError::Timeout {
            job_id: JobId::new("gen_9").unwrap(),
            last_status: RemoteStatus::Running,
            elapsed: Duration::from_secs(300),
            checks: 30,
        });
        let text = plain(&describe_error(&err));
        assert!(text.contains("job:           gen_9"));
        assert!(text.contains("último status: running"));
        assert!(text.contains("decorrido:     300.0s"));
        assert!(text.contains("pode ainda terminar"));
    }

    #[test]
    fn other_errors_are_one_line() {
        let err = TendaError::InvalidRequest("no character rows given".into());
        assert_eq!(plain(&describe_error(&err)), "✗ Invalid request: no character rows given");
    }
}
