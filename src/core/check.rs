//! Check command logic
//!
//! Validates every definition of a settings file and reports what a run
//! would build, without calling any backend.

use super::batch::SettingsFile;
use super::global_config::GlobalConfig;
use super::validate::validate;
use crate::error::DefinitionError;

/// Result of the check operation
#[derive(Debug, Default)]
pub struct CheckResult {
    /// Active definitions that pass validation, in batch order
    pub to_build: Vec<String>,
    /// Inactive definitions
    pub skipped: Vec<String>,
    /// Active definitions that would fail before reaching the backend
    pub errors: Vec<DefinitionError>,
    /// Problems that would not fail a definition outright
    pub warnings: Vec<String>,
}

impl CheckResult {
    /// Whether every active definition passed validation
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a settings file against the current environment
pub fn check(settings: &SettingsFile, global: &GlobalConfig) -> CheckResult {
    let mut result = CheckResult::default();
    let batch = &settings.batch;

    for def in &batch.definitions {
        if !def.active {
            result.skipped.push(def.name.clone());
            continue;
        }
        match validate(def) {
            Ok(()) => result.to_build.push(def.name.clone()),
            Err(e) => result.errors.push(e),
        }
    }

    match settings.backend.build.first() {
        None => result
            .warnings
            .push("No build command configured in [backend]".to_string()),
        Some(program) if !is_available(program) => result
            .warnings
            .push(format!("Build program '{program}' not found in PATH")),
        Some(_) => {}
    }

    let active = || batch.definitions.iter().filter(|d| d.active);

    let has_identity = batch
        .signing_identity
        .as_deref()
        .or(global.run.signing_identity.as_deref())
        .is_some_and(|id| !id.trim().is_empty());
    for def in active().filter(|d| d.wants_signing()) {
        if !has_identity {
            result.warnings.push(format!(
                "'{}' requests signing but no signing identity is configured",
                def.name
            ));
        }
    }
    if active().any(|d| d.wants_signing()) && !is_available(global.signing_program()) {
        result.warnings.push(format!(
            "Signing program '{}' not found in PATH",
            global.signing_program()
        ));
    }

    if active().any(|d| d.archive_after_build) && !is_available(global.archive_program()) {
        result.warnings.push(format!(
            "Archive program '{}' not found in PATH",
            global.archive_program()
        ));
    }

    result
}

fn is_available(program: &str) -> bool {
    which::which(program).is_ok()
}
