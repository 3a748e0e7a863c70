//! Collaborator interfaces consumed by the orchestrator
//!
//! The orchestrator never compiles, compresses or signs anything itself. It
//! delegates to a [`PlatformBackend`], an [`ArchiveService`] and a
//! [`SigningService`], which are injected at construction time. Concrete
//! process-driven implementations live in [`crate::infra`].

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::definition::{Platform, PlatformGroup, Target};
use super::packaging::PackagingFlags;
use crate::error::{ArchiveError, BackendError, SigningError};

/// Value of a platform session parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SessionValue {
    /// Free-form text
    Text(String),
    /// Integer
    Number(i64),
    /// Flag
    Bool(bool),
    /// List of text entries (e.g. rating tables)
    List(Vec<String>),
}

impl fmt::Display for SessionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => f.write_str(&items.join(";")),
        }
    }
}

impl From<&str> for SessionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SessionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for SessionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for SessionValue {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

/// Everything the backend needs to package one definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Artifact location (file or bundle directory)
    pub location: PathBuf,
    /// Included content entries, in order
    pub content: Vec<String>,
    /// Target identity
    pub target: Target,
    /// Packaging flags derived from batch policy
    pub flags: PackagingFlags,
    /// Asset manifest the packager should consult
    pub asset_manifest: PathBuf,
}

/// Classification reported by the backend for one build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildOutcome {
    /// Artifact produced
    Succeeded,
    /// Build aborted by the user or the backend; aborts the whole run
    Cancelled,
    /// Build finished with errors
    Failed,
}

/// Backend report for one build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Classification
    pub outcome: BuildOutcome,
    /// Number of errors reported
    pub error_count: u32,
    /// Number of warnings reported
    pub warning_count: u32,
}

impl BuildReport {
    /// A clean successful report
    pub fn succeeded() -> Self {
        Self {
            outcome: BuildOutcome::Succeeded,
            error_count: 0,
            warning_count: 0,
        }
    }

    /// A cancelled report
    pub fn cancelled() -> Self {
        Self {
            outcome: BuildOutcome::Cancelled,
            error_count: 0,
            warning_count: 0,
        }
    }

    /// A failed report with diagnostics
    pub fn failed(error_count: u32, warning_count: u32) -> Self {
        Self {
            outcome: BuildOutcome::Failed,
            error_count,
            warning_count,
        }
    }
}

/// Target-specific compiler/packager
///
/// `switch_target` may return before the switch has settled; the
/// orchestrator observes completion by polling `is_compiling`.
pub trait PlatformBackend {
    /// Install the merged symbol set for a platform group
    fn set_symbols(&mut self, group: PlatformGroup, symbols: &[String]) -> Result<(), BackendError>;

    /// Switch the active compile target
    fn switch_target(&mut self, target: Target) -> Result<(), BackendError>;

    /// Whether a compilation is still in progress
    fn is_compiling(&mut self) -> bool;

    /// Stage platform-specific data ahead of packaging
    fn stage_platform_data(&mut self, platform: Platform) -> Result<(), BackendError>;

    /// Set one session parameter for a platform
    fn set_session_parameter(
        &mut self,
        platform: Platform,
        key: &str,
        value: &SessionValue,
    ) -> Result<(), BackendError>;

    /// Package the current target
    fn build(&mut self, request: &BuildRequest) -> Result<BuildReport, BackendError>;
}

/// Compresses an output directory into a single archive
pub trait ArchiveService {
    /// Compress `source` into `destination`
    fn compress(&mut self, source: &Path, destination: &Path) -> Result<(), ArchiveError>;
}

/// Applies a code signature to an artifact
pub trait SigningService {
    /// Sign `artifact` with `identity`
    fn sign(&mut self, identity: &str, artifact: &Path) -> Result<(), SigningError>;
}
