//! Interface de linha de comando do Tenda baseada em clap.
//!
//! Define a struct [`Cli`] com os subcomandos [`Command`] (episodes,
//! characters, scenes, summary) e as flags globais de polling e verbosidade.
//! Linhas são numeradas a partir de 1, como aparecem nas tabelas impressas.

use clap::{Parser, Subcommand, ValueEnum};

use crate::records::ApprovalStatus;

/// Tenda: ideias de episódios bíblicos infantis, personagens e arte.
#[derive(Debug, Parser)]
#[command(name = "tenda", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Intervalo entre consultas de status, em milissegundos (texto e imagem).
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Tempo máximo de espera por job, em segundos.
    #[arg(long, global = true)]
    pub max_wait_secs: Option<u64>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Episódios: listar, gerar ideias, aprovar ou rejeitar.
    Episodes {
        #[command(subcommand)]
        action: EpisodeAction,
    },

    /// Personagens: listar, gerar elenco e gerar imagens.
    Characters {
        #[command(subcommand)]
        action: CharacterAction,
    },

    /// Lista os episódios aprovados, prontos para cenas.
    Scenes,

    /// Mostra os totais de episódios e personagens.
    Summary,
}

#[derive(Debug, Subcommand)]
pub enum EpisodeAction {
    /// Lista os episódios da planilha.
    List,

    /// Pede ao assistente novas ideias de episódios.
    Generate {
        /// Quantidade de ideias (1 a 10).
        #[arg(default_value_t = 3)]
        count: u32,
    },

    /// Altera o status de um episódio. Não dispara outras gerações.
    Status {
        /// Número da linha, como mostrado em `episodes list`.
        row: usize,
        status: StatusArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum CharacterAction {
    /// Lista os personagens da planilha.
    List,

    /// Gera o elenco de um episódio aprovado.
    Generate {
        /// Linha do episódio, como mostrado em `episodes list`.
        episode_row: usize,
    },

    /// Gera imagens para os personagens indicados.
    Render {
        /// Linhas dos personagens, como mostrado em `characters list`.
        #[arg(required = true)]
        rows: Vec<usize>,

        /// Correções incluídas no prompt de imagem.
        #[arg(long)]
        note: Option<String>,
    },
}

/// Status aceito na linha de comando, mapeado para [`ApprovalStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Aprovado para produção.
    Approved,
    /// Rejeitado.
    Rejected,
    /// Volta para "Aguardando Aprovação".
    Awaiting,
    /// Pendente.
    Pending,
}

impl From<StatusArg> for ApprovalStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Approved => ApprovalStatus::Approved,
            StatusArg::Rejected => ApprovalStatus::Rejected,
            StatusArg::Awaiting => ApprovalStatus::AwaitingApproval,
            StatusArg::Pending => ApprovalStatus::Pending,
        }
    }
}

/// Converte um número de linha exibido (a partir de 1) no índice usado pela planilha.
pub fn row_index(row: usize) -> Option<usize> {
    row.checked_sub(1)
}
