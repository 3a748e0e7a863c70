//! Batch configuration
//!
//! The ordered list of build definitions plus batch-wide packaging policy.
//! Settings files are TOML (`buildbatch.toml`) or JSON (the payload format
//! used by remote build requests). Both support `${VAR}` environment
//! substitution in string values.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use super::definition::{BuildDefinition, Symbol};
use crate::config::defaults::DEFAULT_CANCEL_EXIT_CODE;
use crate::error::ConfigError;

/// Ordered build definitions and batch-wide options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfiguration {
    /// Definitions in execution order
    #[serde(default, rename = "build")]
    pub definitions: Vec<BuildDefinition>,

    /// Symbols applied to every definition
    #[serde(default)]
    pub general_symbols: Vec<Symbol>,

    /// Release packaging (strips development flags)
    #[serde(default = "default_true")]
    pub optimize_for_release: bool,

    /// Allow a script debugger to attach to the built player
    #[serde(default)]
    pub allow_remote_debugging: bool,

    /// Request fast block compression where the platform allows it
    #[serde(default = "default_true")]
    pub use_fast_compression: bool,

    /// Identity passed to the signing service
    #[serde(default)]
    pub signing_identity: Option<String>,

    /// Included content entries handed to every build
    #[serde(default)]
    pub content: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_cancel_exit_code() -> i32 {
    DEFAULT_CANCEL_EXIT_CODE
}

/// External programs driven by the command backend
///
/// Each command is a program followed by its arguments. Only `build` is
/// required to run a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Packages the current target
    #[serde(default)]
    pub build: Vec<String>,

    /// Switches the compile target; polled until it exits
    #[serde(default)]
    pub switch: Vec<String>,

    /// Stages platform-specific data before packaging
    #[serde(default)]
    pub stage: Vec<String>,

    /// Exit code the build program uses to report cancellation
    #[serde(default = "default_cancel_exit_code")]
    pub cancel_exit_code: i32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            build: Vec::new(),
            switch: Vec::new(),
            stage: Vec::new(),
            cancel_exit_code: DEFAULT_CANCEL_EXIT_CODE,
        }
    }
}

/// Contents of a settings file: the batch plus its backend commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsFile {
    /// The batch itself
    #[serde(flatten)]
    pub batch: BatchConfiguration,

    /// Backend commands
    #[serde(default)]
    pub backend: BackendConfig,
}

impl SettingsFile {
    /// Parse TOML settings, substituting environment variables
    pub fn from_toml(content: &str) -> Result<Self, String> {
        let mut value: toml::Value =
            toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {e}"))?;
        substitute_in_toml(&mut value);
        value
            .try_into()
            .map_err(|e| format!("Invalid batch settings: {e}"))
    }

    /// Parse JSON settings, substituting environment variables
    pub fn from_json(content: &str) -> Result<Self, String> {
        let mut value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| format!("Failed to parse JSON: {e}"))?;
        substitute_in_json(&mut value);
        serde_json::from_value(value).map_err(|e| format!("Invalid batch settings: {e}"))
    }

    /// Load settings from a file, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        let parse: fn(&str) -> Result<Self, String> = match extension.as_str() {
            "toml" => Self::from_toml,
            "json" => Self::from_json,
            _ => return Err(ConfigError::UnsupportedFormat { extension }),
        };

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let settings = parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })?;

        tracing::debug!(
            "Loaded {} definitions ({} active) from {}",
            settings.batch.definitions.len(),
            settings.batch.active_count(),
            path.display()
        );

        Ok(settings)
    }
}

impl Default for BatchConfiguration {
    fn default() -> Self {
        Self {
            definitions: Vec::new(),
            general_symbols: Vec::new(),
            optimize_for_release: true,
            allow_remote_debugging: false,
            use_fast_compression: true,
            signing_identity: None,
            content: Vec::new(),
        }
    }
}

impl BatchConfiguration {
    /// Append a definition
    #[must_use]
    pub fn with_definition(mut self, definition: BuildDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Number of definitions that will actually be built
    pub fn active_count(&self) -> usize {
        self.definitions.iter().filter(|d| d.active).count()
    }

    /// Parse TOML settings, ignoring any backend table
    pub fn from_toml(content: &str) -> Result<Self, String> {
        SettingsFile::from_toml(content).map(|settings| settings.batch)
    }

    /// Parse JSON settings, ignoring any backend object
    pub fn from_json(content: &str) -> Result<Self, String> {
        SettingsFile::from_json(content).map(|settings| settings.batch)
    }

    /// Load a batch from a settings file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        SettingsFile::load(path).map(|settings| settings.batch)
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    })
}

/// Substitute `${VAR}` references with environment values
///
/// Unset variables expand to an empty string.
pub fn substitute_env_vars(input: &str) -> String {
    env_var_pattern()
        .replace_all(input, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

fn substitute_in_toml(value: &mut toml::Value) {
    match value {
        toml::Value::String(s) => *s = substitute_env_vars(s),
        toml::Value::Array(items) => items.iter_mut().for_each(substitute_in_toml),
        toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| substitute_in_toml(v)),
        _ => {}
    }
}

fn substitute_in_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::String(s) => *s = substitute_env_vars(s),
        serde_json::Value::Array(items) => items.iter_mut().for_each(substitute_in_json),
        serde_json::Value::Object(map) => map.values_mut().for_each(substitute_in_json),
        _ => {}
    }
}
