use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;

/// Analyse legal emails and draft clause-constrained replies.
#[derive(Parser)]
#[command(name = "lexreply", version)]
struct Cli {
    #[command(flatten)]
    settings: config::Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract intent, parties, dates, questions, and urgency as JSON.
    Analyze {
        /// Email file, or `-` for stdin.
        email: PathBuf,
        /// Contract snippet file (accepted, not used for clause selection).
        #[arg(long)]
        contract: Option<PathBuf>,
    },
    /// Draft a reply from a JSON draft request (`email_text`, `analysis`, `contract_text`).
    Draft {
        #[arg(long)]
        request: PathBuf,
    },
    /// Analyse an email and draft the reply in one go.
    Run {
        /// Email file, or `-` for stdin.
        email: PathBuf,
        #[arg(long)]
        contract: Option<PathBuf>,
    },
    /// Split an email into subject, greeting, body, signature, and questions.
    Parse {
        /// Email file, or `-` for stdin.
        email: PathBuf,
    },
    /// List the clauses replies may rely on.
    Clauses {
        /// Maximum characters per clause excerpt.
        #[arg(long, default_value_t = 200)]
        limit: usize,
    },
    /// Normalise a loose date and classify its urgency against today (UTC).
    Urgency { date: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    config::init_logging(&cli.settings.log_level)?;
    tracing::info!("lexreply v{}", env!("CARGO_PKG_VERSION"));
    commands::dispatch(cli.command, &cli.settings).await
}
