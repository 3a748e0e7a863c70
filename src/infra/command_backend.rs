//! Platform backend that drives external programs
//!
//! Each backend operation maps to a command from the settings file's
//! `[backend]` table. Build parameters are passed through the environment:
//!
//! | Variable                     | Value                                  |
//! |------------------------------|----------------------------------------|
//! | `BUILDBATCH_GROUP`           | platform group                         |
//! | `BUILDBATCH_PLATFORM`        | platform                               |
//! | `BUILDBATCH_SYMBOLS`         | active symbols, `;`-separated          |
//! | `BUILDBATCH_OUTPUT`          | artifact location                      |
//! | `BUILDBATCH_CONTENT`         | content entries, `;`-separated         |
//! | `BUILDBATCH_FLAGS`           | packaging flags, `,`-separated         |
//! | `BUILDBATCH_ASSET_MANIFEST`  | asset bundle manifest path             |
//! | `BUILDBATCH_PARAM_<KEY>`     | one per session parameter              |
//!
//! The switch command runs in the background and compilation is considered
//! settled once it exits.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::process::{Child, Command, Output, Stdio};
use std::sync::OnceLock;

use crate::core::backend::{BuildReport, BuildRequest, PlatformBackend, SessionValue};
use crate::core::batch::BackendConfig;
use crate::core::definition::{Platform, PlatformGroup, Target};
use crate::error::BackendError;

const ENV_PREFIX: &str = "BUILDBATCH_";

/// Backend that shells out to configured commands
#[derive(Debug)]
pub struct CommandBackend {
    config: BackendConfig,
    symbols: HashMap<PlatformGroup, Vec<String>>,
    session: HashMap<Platform, BTreeMap<String, String>>,
    switch_child: Option<Child>,
    /// Set when the switch command ends badly, reported by the next step
    switch_failure: Option<String>,
}

impl CommandBackend {
    /// Create a backend over the given commands
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            symbols: HashMap::new(),
            session: HashMap::new(),
            switch_child: None,
            switch_failure: None,
        }
    }

    /// Whether a build command is configured
    pub fn can_build(&self) -> bool {
        !self.config.build.is_empty()
    }

    fn command(argv: &[String], target: Target) -> Option<Command> {
        let (program, args) = argv.split_first()?;
        let mut command = Command::new(program);
        command
            .args(args)
            .env(env_key("GROUP"), target.group.as_str())
            .env(env_key("PLATFORM"), target.platform.as_str());
        Some(command)
    }

    fn take_switch_failure(&mut self) -> Result<(), BackendError> {
        match self.switch_failure.take() {
            Some(message) => Err(BackendError::StepFailed {
                step: "switch".to_string(),
                message,
            }),
            None => Ok(()),
        }
    }

    fn program(argv: &[String]) -> String {
        argv.first().cloned().unwrap_or_default()
    }

    fn run(step: &str, argv: &[String], mut command: Command) -> Result<Output, BackendError> {
        tracing::debug!("Running {step} command: {}", argv.join(" "));
        command.output().map_err(|e| BackendError::Launch {
            program: Self::program(argv),
            error: e.to_string(),
        })
    }

    fn classify(&self, output: &Output) -> BuildReport {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut report = BuildReport::succeeded();

        for line in stdout.lines().chain(stderr.lines()) {
            tracing::debug!("build: {line}");
            match diagnostic_kind(line) {
                Some(Diagnostic::Error) => report.error_count += 1,
                Some(Diagnostic::Warning) => report.warning_count += 1,
                None => {}
            }
        }

        let cancelled = match output.status.code() {
            Some(0) => return report,
            Some(code) => code == self.config.cancel_exit_code,
            // killed by a signal
            None => true,
        };

        let base = if cancelled {
            BuildReport::cancelled()
        } else {
            BuildReport::failed(0, 0)
        };
        BuildReport {
            error_count: report.error_count,
            warning_count: report.warning_count,
            ..base
        }
    }
}

impl Drop for CommandBackend {
    fn drop(&mut self) {
        if let Some(mut child) = self.switch_child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn env_key(name: &str) -> String {
    format!("{ENV_PREFIX}{name}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Diagnostic {
    Error,
    Warning,
}

fn diagnostic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(error|warning)(\s+[A-Z]*\d+)?\s*:").expect("diagnostic pattern is valid")
    })
}

/// Classify a compiler-style output line (`error CS0103: ...`, `warning: ...`)
fn diagnostic_kind(line: &str) -> Option<Diagnostic> {
    let caps = diagnostic_pattern().captures(line)?;
    if caps[1].eq_ignore_ascii_case("error") {
        Some(Diagnostic::Error)
    } else {
        Some(Diagnostic::Warning)
    }
}

impl PlatformBackend for CommandBackend {
    fn set_symbols(&mut self, group: PlatformGroup, symbols: &[String]) -> Result<(), BackendError> {
        self.symbols.insert(group, symbols.to_vec());
        Ok(())
    }

    fn switch_target(&mut self, target: Target) -> Result<(), BackendError> {
        let Some(mut command) = Self::command(&self.config.switch, target) else {
            return Ok(());
        };

        if let Some(mut previous) = self.switch_child.take() {
            let _ = previous.kill();
            let _ = previous.wait();
        }
        self.switch_failure = None;

        let symbols = self
            .symbols
            .get(&target.group)
            .map(|s| s.join(";"))
            .unwrap_or_default();
        command
            .env(env_key("SYMBOLS"), symbols)
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        tracing::debug!("Spawning switch command: {}", self.config.switch.join(" "));
        let child = command.spawn().map_err(|e| BackendError::Launch {
            program: Self::program(&self.config.switch),
            error: e.to_string(),
        })?;
        self.switch_child = Some(child);
        Ok(())
    }

    fn is_compiling(&mut self) -> bool {
        let Some(child) = self.switch_child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                if !status.success() {
                    tracing::warn!("Switch command exited with {status}");
                    self.switch_failure = Some(format!("switch command exited with {status}"));
                }
                self.switch_child = None;
                false
            }
            Err(e) => {
                tracing::warn!("Failed to poll switch command: {e}");
                self.switch_failure = Some(format!("failed to poll switch command: {e}"));
                self.switch_child = None;
                false
            }
        }
    }

    fn stage_platform_data(&mut self, platform: Platform) -> Result<(), BackendError> {
        self.take_switch_failure()?;
        let target = Target {
            group: platform.group(),
            platform,
        };
        let Some(command) = Self::command(&self.config.stage, target) else {
            return Ok(());
        };

        let output = Self::run("stage", &self.config.stage, command)?;
        if !output.status.success() {
            return Err(BackendError::StepFailed {
                step: "stage".to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn set_session_parameter(
        &mut self,
        platform: Platform,
        key: &str,
        value: &SessionValue,
    ) -> Result<(), BackendError> {
        self.session
            .entry(platform)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn build(&mut self, request: &BuildRequest) -> Result<BuildReport, BackendError> {
        self.take_switch_failure()?;
        let Some(mut command) = Self::command(&self.config.build, request.target) else {
            return Err(BackendError::Other("no build command configured".to_string()));
        };

        let symbols = self
            .symbols
            .get(&request.target.group)
            .map(|s| s.join(";"))
            .unwrap_or_default();

        command
            .env(env_key("SYMBOLS"), symbols)
            .env(env_key("OUTPUT"), &request.location)
            .env(env_key("CONTENT"), request.content.join(";"))
            .env(env_key("FLAGS"), request.flags.names().join(","))
            .env(env_key("ASSET_MANIFEST"), &request.asset_manifest);

        if let Some(params) = self.session.get(&request.target.platform) {
            for (key, value) in params {
                command.env(env_key(&format!("PARAM_{}", key.to_uppercase())), value);
            }
        }

        let output = Self::run("build", &self.config.build, command)?;
        Ok(self.classify(&output))
    }
}
