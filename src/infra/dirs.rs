//! Platform-specific directory management
//!
//! Provides the config directory holding the global `config.toml`.
//! Follows XDG Base Directory Specification on Linux and standard locations on macOS.
//!
//! `BUILDBATCH_CONFIG_DIR` overrides the default location.

use std::env;
use std::path::PathBuf;

use crate::config::defaults::GLOBAL_CONFIG_FILE;

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "BUILDBATCH_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "buildbatch";

/// Platform-specific directory provider
#[derive(Debug, Clone)]
pub struct BuildBatchDirs {
    config_dir: PathBuf,
}

impl BuildBatchDirs {
    /// Create a new `BuildBatchDirs` instance
    ///
    /// Checks the environment first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/buildbatch` or `~/.config/buildbatch`
    /// - macOS: `~/Library/Application Support/buildbatch`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join(GLOBAL_CONFIG_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for BuildBatchDirs {
    fn default() -> Self {
        Self::new()
    }
}
