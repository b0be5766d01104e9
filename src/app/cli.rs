//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drift - pointer telemetry pipeline
#[derive(Parser, Debug)]
#[command(name = "drift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSON-lines trace of pointer events and commands
    Replay {
        /// Input trace file (.jsonl)
        #[arg(short, long)]
        input: PathBuf,

        /// Skip writing session exports
        #[arg(long)]
        no_persist: bool,

        /// Override the export directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score a feature vector (JSON object keyed by feature name)
    Predict {
        /// Input feature file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Summarize a click-target drill trace
    Drill {
        /// Input drill trace (.jsonl)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "transport.endpoint", "capture.sample_interval_ms")
        key: String,
    },

    /// Print the default configuration path
    Path,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
