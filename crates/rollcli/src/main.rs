//! rollcli - load MIDI corpora into multi-instrument pianoroll datasets
//!
//! Subcommands:
//! - `rollcli load <paths...>` - Build a dataset and print a summary
//! - `rollcli inspect <file>` - Show which instruments a single file holds
//! - `rollcli key <path>` - Print the cache key for a path
//! - `rollcli evict <paths...>` - Remove cached entries

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod discover;
mod progress;

#[derive(Parser)]
#[command(name = "rollcli")]
#[command(about = "Load MIDI files into multi-instrument pianoroll datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a dataset from files and directories
    Load(commands::LoadArgs),

    /// Parse one file and list its instruments
    Inspect {
        /// MIDI file
        file: PathBuf,

        /// Time steps per quarter note
        #[arg(long, default_value = "24")]
        steps_per_beat: u32,
    },

    /// Print the cache key (and entry location) for a path
    Key {
        /// Path as it would be passed to `load`
        path: PathBuf,

        /// Cache directory (default: ROLLBOOK_CACHE_PATH, then ~/.rollbook/cache)
        #[arg(long)]
        cache: Option<PathBuf>,
    },

    /// Remove cached entries for the given paths
    Evict {
        /// Paths whose entries should be dropped
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Cache directory (default: ROLLBOOK_CACHE_PATH, then ~/.rollbook/cache)
        #[arg(long)]
        cache: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Load(args) => {
            commands::load(args)?;
        }
        Commands::Inspect {
            file,
            steps_per_beat,
        } => {
            commands::inspect(&file, steps_per_beat)?;
        }
        Commands::Key { path, cache } => {
            commands::key(&path, cache)?;
        }
        Commands::Evict { paths, cache } => {
            commands::evict(&paths, cache)?;
        }
    }

    Ok(())
}
