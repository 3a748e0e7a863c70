//! Check command implementation
//!
//! Implements `buildbatch check` to validate a batch without building.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::cli::output::{status, OutputConfig};
use crate::core::batch::SettingsFile;
use crate::core::check;
use crate::core::global_config::GlobalConfig;
use crate::infra::dirs::BuildBatchDirs;

/// Execute the check command
pub async fn execute(settings_path: &Path, output: &OutputConfig) -> Result<()> {
    let settings = SettingsFile::load(settings_path)
        .with_context(|| format!("Failed to load batch from {}", settings_path.display()))?;
    let global = GlobalConfig::load(&BuildBatchDirs::new())?;

    tracing::info!("Checking batch: {}", settings_path.display());
    let result = check::check(&settings, &global);

    if output.json {
        let errors: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
        let report = serde_json::json!({
            "valid": result.is_valid(),
            "to_build": result.to_build,
            "skipped": result.skipped,
            "errors": errors,
            "warnings": result.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if output.show_text() {
        println!("Checking {}...\n", settings_path.display());

        if result.is_valid() {
            println!("{} All active definitions are valid", status::SUCCESS);
        } else {
            println!("{} Definition errors found", status::ERROR);
            for error in &result.errors {
                println!("  - {error}");
            }
        }

        if !result.warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &result.warnings {
                println!("  {} {warning}", status::WARNING);
            }
        }

        println!("\nDefinitions that would be built:");
        if result.to_build.is_empty() {
            println!("  (none)");
        }
        for name in &result.to_build {
            println!("  • {name}");
        }
        for name in &result.skipped {
            println!("  {} {name} (inactive)", status::SKIPPED);
        }
    }

    if !result.is_valid() {
        bail!("{} definition(s) failed validation", result.errors.len());
    }
    Ok(())
}
