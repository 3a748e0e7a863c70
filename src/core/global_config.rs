//! Global configuration management
//!
//! Reads user-level defaults from `config.toml` in the config directory:
//! tick interval, external tool names and a fallback signing identity.
//! Values in a batch settings file or on the command line take precedence.

use crate::config::defaults::{
    DEFAULT_ARCHIVE_PROGRAM, DEFAULT_SIGNING_PROGRAM, DEFAULT_TICK_INTERVAL_MS,
};
use crate::infra::dirs::BuildBatchDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for buildbatch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Run loop settings
    #[serde(default)]
    pub run: RunConfig,

    /// External tool names
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Run loop settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Milliseconds between orchestrator ticks
    pub tick_interval_ms: Option<u64>,

    /// Signing identity used when a batch does not name one
    pub signing_identity: Option<String>,
}

/// External tool names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Archive program
    pub archive: Option<String>,

    /// Code-signing program
    pub signing: Option<String>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `GlobalConfigError::ParseError` if the config file exists but
    /// contains invalid TOML.
    pub fn load(dirs: &BuildBatchDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Effective tick interval in milliseconds
    #[must_use]
    pub fn tick_interval_ms(&self) -> u64 {
        self.run
            .tick_interval_ms
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS)
    }

    /// Effective archive program
    #[must_use]
    pub fn archive_program(&self) -> &str {
        self.tools
            .archive
            .as_deref()
            .unwrap_or(DEFAULT_ARCHIVE_PROGRAM)
    }

    /// Effective signing program
    #[must_use]
    pub fn signing_program(&self) -> &str {
        self.tools
            .signing
            .as_deref()
            .unwrap_or(DEFAULT_SIGNING_PROGRAM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GlobalConfig::default();
        assert_eq!(config.tick_interval_ms(), DEFAULT_TICK_INTERVAL_MS);
        assert_eq!(config.archive_program(), "zip");
        assert_eq!(config.signing_program(), "codesign");
        assert!(config.run.signing_identity.is_none());
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = GlobalConfig::load_from_path(&temp_dir.path().join("config.toml")).unwrap();
        assert!(config.tools.archive.is_none());
    }

    #[test]
    fn test_load_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[run]
tick_interval_ms = 250
signing_identity = "Developer ID Application: Studio"

[tools]
archive = "/usr/local/bin/zip"
"#,
        )
        .unwrap();

        let config = GlobalConfig::load_from_path(&config_path).unwrap();
        assert_eq!(config.tick_interval_ms(), 250);
        assert_eq!(config.archive_program(), "/usr/local/bin/zip");
        assert_eq!(
            config.run.signing_identity.as_deref(),
            Some("Developer ID Application: Studio")
        );
    }

    #[test]
    fn test_zero_tick_interval_falls_back() {
        let config = GlobalConfig {
            run: RunConfig {
                tick_interval_ms: Some(0),
                signing_identity: None,
            },
            ..GlobalConfig::default()
        };
        assert_eq!(config.tick_interval_ms(), DEFAULT_TICK_INTERVAL_MS);
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "invalid toml [[[").unwrap();

        assert!(matches!(
            GlobalConfig::load_from_path(&config_path),
            Err(GlobalConfigError::ParseError { .. })
        ));
    }
}
