//! quiz: flashcard drills from YAML files with spaced repetition.

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use quiz_core::model::SessionMode;

mod commands;
mod config;
mod interrupt;
mod terminal;

#[derive(Parser)]
#[command(name = "quiz", version, about = "Command-line quiz tool with spaced repetition")]
struct Cli {
    /// Directory holding quiz.toml, the exercises and the progress file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path (defaults to quiz.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all available quizzes
    List,

    /// Start a quiz session
    Start {
        /// Quiz name, folder name or path
        target: String,

        /// spaced, shuffle or quick
        #[arg(default_value = "spaced")]
        mode: SessionMode,
    },

    /// Show progress statistics
    Progress {
        /// `global`, a folder or a quiz
        #[arg(default_value = "global")]
        target: String,
    },
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = config::resolve_data_dir(cli.data_dir);
    let config = config::load_config(&data_dir, cli.config.as_deref())?;
    let ctx = commands::Context::new(&config, &data_dir)?;

    match cli.command {
        Commands::List => commands::list::execute(&ctx),
        Commands::Start { target, mode } => commands::start::execute(&ctx, &target, mode),
        Commands::Progress { target } => commands::progress::execute(&ctx, &target),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
