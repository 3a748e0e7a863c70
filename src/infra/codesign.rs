//! Signing service backed by an external `codesign` program

use std::path::Path;
use std::process::Command;

use crate::config::defaults::DEFAULT_SIGNING_PROGRAM;
use crate::core::backend::SigningService;
use crate::error::SigningError;

/// Signs artifacts with `codesign --deep -f -v -s <identity> <artifact>`
#[derive(Debug, Clone)]
pub struct CodesignSigner {
    program: String,
}

impl Default for CodesignSigner {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNING_PROGRAM)
    }
}

impl CodesignSigner {
    /// Use `program` for signing
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SigningService for CodesignSigner {
    fn sign(&mut self, identity: &str, artifact: &Path) -> Result<(), SigningError> {
        let program = which::which(&self.program).map_err(|_| SigningError::ToolNotFound {
            program: self.program.clone(),
        })?;

        let output = Command::new(program)
            .args(["--deep", "-f", "-v", "-s", identity])
            .arg(artifact)
            .output()
            .map_err(|e| SigningError::Failed {
                artifact: artifact.to_path_buf(),
                error: e.to_string(),
            })?;

        // codesign reports progress on stderr even when it succeeds
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!("codesign: {line}");
        }

        if !output.status.success() {
            return Err(SigningError::Failed {
                artifact: artifact.to_path_buf(),
                error: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}
