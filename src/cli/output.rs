//! Output formatting and progress indicators
//!
//! This module provides the spinner shown during a run, status prefixes and
//! the global output mode selected on the command line.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::Level;

/// Output mode derived from the global flags
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Only errors are printed
    pub quiet: bool,
    /// Machine-readable output on stdout
    pub json: bool,
    /// Verbosity count (`-v`, `-vv`, ...)
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration from the global flags
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Most verbose log level to emit
    ///
    /// `--quiet` wins over `-v`.
    pub fn log_level(&self) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Whether to draw a spinner
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json && self.verbose == 0
    }

    /// Whether human-readable text should be printed
    pub fn show_text(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} [{elapsed_precise}] {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Skipped prefix
    pub const SKIPPED: &str = "○";
}
