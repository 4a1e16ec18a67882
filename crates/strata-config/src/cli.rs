//! Command-line argument parsing for the Strata server.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata server command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "strata-server", about = "Strata terrain server")]
pub struct CliArgs {
    /// Save name.
    #[arg(long, default_value = "world")]
    pub save: String,

    /// Seed used when the save does not exist yet.
    #[arg(long)]
    pub seed: Option<u64>,

    /// First slice to load.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub from: i64,

    /// One past the last slice to load.
    #[arg(long, default_value_t = 64, allow_negative_numbers = true)]
    pub to: i64,

    /// Run one gravity step over the loaded range before printing.
    #[arg(long)]
    pub gravity: bool,

    /// Directory holding save folders.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref dir) = args.data_dir {
            self.server.data_dir = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
