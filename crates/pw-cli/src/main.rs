//! CLI frontend for the Patchwork interactive fiction engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "pw",
    about = "Patchwork: play and check branching JSON stories",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a story interactively, reading choice numbers from stdin
    Play {
        /// Story JSON file
        story: PathBuf,

        /// Start ID to begin from (default: first available start)
        #[arg(long)]
        start: Option<String>,

        /// Profile file shared across sessions
        #[arg(long, default_value = "profile.json")]
        profile: PathBuf,

        /// Directory holding save slots
        #[arg(long, default_value = "saves")]
        saves: PathBuf,

        /// Resume from a save slot instead of starting fresh
        #[arg(long)]
        load: Option<String>,

        /// Engine configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load a story and report broken references
    Check {
        /// Story JSON file
        story: PathBuf,
    },

    /// List the starts of a story and whether each is unlocked
    Starts {
        /// Story JSON file
        story: PathBuf,

        /// Profile file shared across sessions
        #[arg(long, default_value = "profile.json")]
        profile: PathBuf,
    },

    /// Show unlocked starts and seen endings
    Profile {
        /// Profile file shared across sessions
        #[arg(long, default_value = "profile.json")]
        profile: PathBuf,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            story,
            start,
            profile,
            saves,
            load,
            config,
        } => commands::play::run(&commands::play::PlayOptions {
            story,
            start,
            profile,
            saves,
            load,
            config,
        }),
        Commands::Check { story } => commands::check::run(&story),
        Commands::Starts { story, profile } => commands::starts::run(&story, &profile),
        Commands::Profile { profile } => commands::profile::run(&profile),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
