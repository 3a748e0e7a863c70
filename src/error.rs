//! Error types for buildbatch
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::definition::{Platform, PlatformGroup};

/// Configuration errors for a single build definition
///
/// These fail only the definition they belong to, never the whole run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// Output directory is empty
    #[error("Definition '{name}' has an empty output directory")]
    EmptyOutputDirectory { name: String },

    /// Platform does not belong to the declared group
    #[error("Definition '{name}': platform '{platform}' does not belong to group '{group}'")]
    GroupMismatch {
        name: String,
        platform: Platform,
        group: PlatformGroup,
    },

    /// Missing required platform-specific field
    #[error("Definition '{name}' is missing field '{field}' required by platform '{platform}'")]
    MissingPlatformField {
        name: String,
        platform: Platform,
        field: &'static str,
    },
}

/// Errors raised by a platform backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend program could not be started
    #[error("Failed to launch '{program}': {error}")]
    Launch { program: String, error: String },

    /// Backend program reported an error
    #[error("Backend step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    /// Output directory could not be prepared
    #[error("Failed to prepare output directory: {0}")]
    Output(#[from] FilesystemError),

    /// Anything else the backend reports
    #[error("{0}")]
    Other(String),
}

/// Archive errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// Archive tool not installed
    #[error("Archive tool '{program}' not found in PATH")]
    ToolNotFound { program: String },

    /// Source directory is missing
    #[error("Nothing to archive: '{path}' does not exist")]
    SourceMissing { path: PathBuf },

    /// Archive tool failed
    #[error("Archiving '{source_dir}' failed: {error}")]
    Failed { source_dir: PathBuf, error: String },
}

/// Code-signing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// No identity configured
    #[error("No signing identity configured")]
    MissingIdentity,

    /// Signing tool not installed
    #[error("Signing tool '{program}' not found in PATH")]
    ToolNotFound { program: String },

    /// Signing tool failed
    #[error("Signing '{artifact}' failed: {error}")]
    Failed { artifact: PathBuf, error: String },
}

/// Orchestrator control errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// `start_run` called while a run is in progress
    #[error("A batch run is already in progress")]
    AlreadyRunning,
}

/// Batch configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings file not found
    #[error("Settings file not found at '{path}'")]
    NotFound { path: PathBuf },

    /// Failed to read settings
    #[error("Failed to read '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse settings
    #[error("Failed to parse '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Unsupported settings format
    #[error("Unsupported settings format '{extension}' (expected .toml or .json)")]
    UnsupportedFormat { extension: String },
}

/// Filesystem errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },
}
