//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod check;
pub mod list;
pub mod run;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use super::output::OutputConfig;
use crate::config::defaults::DEFAULT_SETTINGS_FILE;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every active build definition in order
    Run {
        /// Batch settings file (.toml or .json)
        #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
        settings: PathBuf,

        /// Milliseconds between orchestrator ticks
        #[arg(long, value_name = "MS")]
        tick_ms: Option<u64>,

        /// Build only the named definitions (repeatable)
        #[arg(long, value_name = "NAME")]
        only: Vec<String>,
    },

    /// Validate the batch without building
    Check {
        /// Batch settings file (.toml or .json)
        #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
        settings: PathBuf,
    },

    /// List build definitions
    List {
        /// Batch settings file (.toml or .json)
        #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
        settings: PathBuf,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self, output: &OutputConfig) -> Result<()> {
        match self {
            Self::Run {
                settings,
                tick_ms,
                only,
            } => {
                let options = run::RunOptions {
                    settings,
                    tick_ms,
                    only,
                };
                run::execute(options, output).await
            }
            Self::Check { settings } => check::execute(&settings, output).await,
            Self::List { settings } => list::execute(&settings, output).await,
        }
    }
}
