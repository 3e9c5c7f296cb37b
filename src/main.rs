use std::future::Future;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use tenda::cli::{self, CharacterAction, Cli, Command, EpisodeAction};
use tenda::config::TendaConfig;
use tenda::error::TendaError;
use tenda::studio::Studio;
use tenda::ui::{self, WaitSpinner};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {err:#}", console::style("✗").red().bold());
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, abandoning outstanding waits");
                cancel.cancel();
            }
        }
    });

    match run(cli.command, config, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::print_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tenda=debug" } else { "tenda=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<TendaConfig> {
    let mut config = TendaConfig::load().context("failed to load tenda.toml")?;
    config.override_polling(cli.poll_interval_ms, cli.max_wait_secs);
    config.validate()?;
    Ok(config)
}

async fn run(
    command: Command,
    config: TendaConfig,
    cancel: &CancellationToken,
) -> Result<(), TendaError> {
    let studio = Studio::connect(config)?;

    match command {
        Command::Episodes { action } => match action {
            EpisodeAction::List => ui::print_episodes(&studio.list_episodes().await?),
            EpisodeAction::Generate { count } => {
                let episodes = waiting(
                    &format!("Gerando {count} ideias de episódios..."),
                    |added| format!("{} episódios adicionados", added.len()),
                    studio.generate_episodes(count, cancel),
                )
                .await?;
                ui::print_episodes(&episodes);
            }
            EpisodeAction::Status { row, status } => {
                let episode = studio
                    .set_episode_status(displayed_row(row)?, status.into())
                    .await?;
                println!(
                    "  {} agora está {}",
                    episode.title,
                    ui::status_label(episode.status)
                );
            }
        },
        Command::Characters { action } => match action {
            CharacterAction::List => ui::print_characters(&studio.list_characters().await?),
            CharacterAction::Generate { episode_row } => {
                let characters = waiting(
                    "Gerando personagens do episódio...",
                    |added| format!("{} personagens adicionados", added.len()),
                    studio.generate_characters(displayed_row(episode_row)?, cancel),
                )
                .await?;
                ui::print_characters(&characters);
            }
            CharacterAction::Render { rows, note } => {
                let rows = rows
                    .into_iter()
                    .map(displayed_row)
                    .collect::<Result<Vec<_>, _>>()?;
                let outcomes = waiting(
                    &format!("Gerando {} imagens...", rows.len()),
                    |outcomes| {
                        let done = outcomes.iter().filter(|o| o.result.is_ok()).count();
                        format!("{done} de {} imagens prontas", outcomes.len())
                    },
                    studio.render_character_images(&rows, note.as_deref(), cancel),
                )
                .await?;
                ui::print_render_outcomes(&outcomes);
            }
        },
        Command::Scenes => ui::print_episodes(&studio.approved_episodes().await?),
        Command::Summary => ui::print_summary(&studio.summary().await?),
    }
    Ok(())
}

/// Runs `work` behind a spinner, replacing it with `done` on success.
async fn waiting<T>(
    message: &str,
    done: impl FnOnce(&T) -> String,
    work: impl Future<Output = Result<T, TendaError>>,
) -> Result<T, TendaError> {
    let spinner = WaitSpinner::start(message);
    match work.await {
        Ok(value) => {
            spinner.finish_ok(&done(&value));
            Ok(value)
        }
        Err(err) => {
            spinner.finish_err();
            Err(err)
        }
    }
}

fn displayed_row(row: usize) -> Result<usize, TendaError> {
    cli::row_index(row).ok_or_else(|| TendaError::InvalidRequest("row numbers start at 1".into()))
}
