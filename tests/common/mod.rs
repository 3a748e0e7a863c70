//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory holding a settings file and the build
/// outputs, plus an isolated global config directory.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
    /// Global config directory, empty unless a test writes to it
    pub config_dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            config_dir: TempDir::new().expect("Failed to create config directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    #[allow(dead_code)]
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    #[allow(dead_code)]
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    #[allow(dead_code)]
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run the buildbatch binary inside the project
    #[allow(dead_code)]
    pub fn run(&self, args: &[&str]) -> Output {
        self.run_with_env(args, &[])
    }

    /// Run the buildbatch binary with extra environment variables
    #[allow(dead_code)]
    pub fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_buildbatch"));
        cmd.current_dir(self.path())
            .env("BUILDBATCH_CONFIG_DIR", self.config_dir.path())
            .env_remove("RUST_LOG")
            .args(args);
        for (key, value) in env {
            cmd.env(key, value);
        }
        cmd.output().expect("Failed to execute buildbatch")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse stdout of a `--json` invocation
#[allow(dead_code)]
pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

/// Sample batch: one active Linux build writing a marker file, one inactive
/// Android build
#[allow(dead_code)]
pub const SAMPLE_SETTINGS: &str = r#"
content = ["Scenes/Boot"]

[[general_symbols]]
name = "RELEASE_LOGS"

[[build]]
name = "Linux"
platform = "linux64"
output_directory = "Builds/Linux/"
output_filename = "game.txt"

[[build]]
name = "Android"
active = false
platform = "android"
output_directory = "Builds/Android"

[backend]
build = ["sh", "-c", "printf '%s' \"$BUILDBATCH_SYMBOLS\" > \"$BUILDBATCH_OUTPUT\""]
"#;
