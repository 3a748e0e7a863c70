//! Archive service backed by an external `zip` program
//!
//! The program runs inside the source directory so the archive holds the
//! directory's contents without any leading path.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::defaults::DEFAULT_ARCHIVE_PROGRAM;
use crate::core::backend::ArchiveService;
use crate::error::ArchiveError;

/// Compresses output directories with a zip-compatible program
#[derive(Debug, Clone)]
pub struct ZipArchiver {
    program: String,
}

impl Default for ZipArchiver {
    fn default() -> Self {
        Self::new(DEFAULT_ARCHIVE_PROGRAM)
    }
}

impl ZipArchiver {
    /// Use `program` (a name on PATH or a path) for compression
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Whether the archive program can be found
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ArchiveError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| ArchiveError::Failed {
            source_dir: path.to_path_buf(),
            error: e.to_string(),
        })
}

impl ArchiveService for ZipArchiver {
    fn compress(&mut self, source: &Path, destination: &Path) -> Result<(), ArchiveError> {
        if !source.is_dir() {
            return Err(ArchiveError::SourceMissing {
                path: source.to_path_buf(),
            });
        }

        let program = which::which(&self.program).map_err(|_| ArchiveError::ToolNotFound {
            program: self.program.clone(),
        })?;

        let failed = |error: String| ArchiveError::Failed {
            source_dir: source.to_path_buf(),
            error,
        };

        let destination = absolute(destination)?;
        if destination.exists() {
            std::fs::remove_file(&destination).map_err(|e| failed(e.to_string()))?;
        }

        tracing::debug!(
            "Running {} in {} -> {}",
            program.display(),
            source.display(),
            destination.display()
        );

        let output = Command::new(&program)
            .args(["-r", "-q"])
            .arg(&destination)
            .arg(".")
            .current_dir(source)
            .output()
            .map_err(|e| failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(stderr.trim().to_string()));
        }

        Ok(())
    }
}
