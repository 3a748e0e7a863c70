//! List command implementation

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::output::{status, OutputConfig};
use crate::core::batch::SettingsFile;

/// Execute the list command
pub async fn execute(settings_path: &Path, output: &OutputConfig) -> Result<()> {
    let settings = SettingsFile::load(settings_path)
        .with_context(|| format!("Failed to load batch from {}", settings_path.display()))?;
    let batch = &settings.batch;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&batch.definitions)?);
        return Ok(());
    }
    if !output.show_text() {
        return Ok(());
    }

    println!(
        "{} definitions ({} active)\n",
        batch.definitions.len(),
        batch.active_count()
    );
    for (index, def) in batch.definitions.iter().enumerate() {
        let marker = if def.active {
            status::SUCCESS
        } else {
            status::SKIPPED
        };
        println!(
            "{marker} {:>2}. {:<20} {:<16} {}",
            index + 1,
            def.name,
            def.target().to_string(),
            def.build_location().display()
        );
        let mut extras = Vec::new();
        if def.archive_after_build {
            extras.push("archive");
        }
        if def.wants_signing() {
            extras.push("sign");
        }
        if !extras.is_empty() {
            println!("       {}", extras.join(", "));
        }
    }
    Ok(())
}
