//! Run command implementation
//!
//! Implements `buildbatch run`: loads the batch, wires the process-backed
//! collaborators into the orchestrator and ticks it on a timer until the run
//! ends. Ctrl-C requests a stop, honored between steps.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::cli::output::{create_spinner, status, OutputConfig};
use crate::core::backend::{ArchiveService, PlatformBackend, SigningService};
use crate::core::batch::{BatchConfiguration, SettingsFile};
use crate::core::global_config::GlobalConfig;
use crate::core::orchestrator::BuildOrchestrator;
use crate::core::result::{BatchResult, DefinitionStatus};
use crate::infra::archive::ZipArchiver;
use crate::infra::codesign::CodesignSigner;
use crate::infra::command_backend::CommandBackend;
use crate::infra::dirs::BuildBatchDirs;

/// Options for the run command
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Settings file
    pub settings: PathBuf,
    /// Tick interval override
    pub tick_ms: Option<u64>,
    /// Restrict the run to these definitions
    pub only: Vec<String>,
}

/// Execute the run command
pub async fn execute(options: RunOptions, output: &OutputConfig) -> Result<()> {
    let settings = SettingsFile::load(&options.settings)
        .with_context(|| format!("Failed to load batch from {}", options.settings.display()))?;
    let global = GlobalConfig::load(&BuildBatchDirs::new())?;

    let mut batch = settings.batch;
    if batch.signing_identity.is_none() {
        batch.signing_identity = global.run.signing_identity.clone();
    }
    restrict_to(&mut batch, &options.only)?;

    let backend = CommandBackend::new(settings.backend);
    if !backend.can_build() && batch.active_count() > 0 {
        bail!(
            "No build command configured. Add a [backend] table with `build = [...]` to {}",
            options.settings.display()
        );
    }

    let orchestrator = BuildOrchestrator::new(
        backend,
        ZipArchiver::new(global.archive_program()),
        CodesignSigner::new(global.signing_program()),
    );
    let tick = Duration::from_millis(
        options
            .tick_ms
            .filter(|ms| *ms > 0)
            .unwrap_or_else(|| global.tick_interval_ms()),
    );

    let result = drive(orchestrator, batch, tick, output).await?;
    report(&result, output)?;

    if result.canceled {
        bail!("Batch canceled: {}", result.summary());
    }
    if result.failed > 0 {
        bail!("{} of {} builds failed", result.failed, result.processed());
    }
    Ok(())
}

/// Mark every definition not named in `only` inactive
fn restrict_to(batch: &mut BatchConfiguration, only: &[String]) -> Result<()> {
    if only.is_empty() {
        return Ok(());
    }
    for name in only {
        if !batch.definitions.iter().any(|d| &d.name == name) {
            bail!("No build definition named '{name}'");
        }
    }
    for def in &mut batch.definitions {
        def.active = def.active && only.contains(&def.name);
    }
    Ok(())
}

/// Tick the orchestrator until the run ends and return the final result
async fn drive<B, A, S>(
    mut orchestrator: BuildOrchestrator<B, A, S>,
    batch: BatchConfiguration,
    tick: Duration,
    output: &OutputConfig,
) -> Result<BatchResult>
where
    B: PlatformBackend + Send + 'static,
    A: ArchiveService + Send + 'static,
    S: SigningService + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    orchestrator.on_complete(move |result: &BatchResult| {
        let _ = tx.send(result.clone());
    });
    orchestrator.start_run(batch)?;

    let stop = orchestrator.stop_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current step");
            stop.request_stop();
        }
    });

    let spinner = output.show_progress().then(|| create_spinner("Starting batch"));
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while orchestrator.is_running() {
        interval.tick().await;
        // Build and archive steps block for the duration of the external program
        orchestrator = tokio::task::spawn_blocking(move || {
            orchestrator.advance_tick();
            orchestrator
        })
        .await
        .context("Orchestrator tick panicked")?;

        if let Some(pb) = &spinner {
            pb.set_message(progress_message(&orchestrator));
        }
    }

    ctrl_c.abort();
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    Ok(rx
        .try_recv()
        .unwrap_or_else(|_| orchestrator.current_result()))
}

fn progress_message<B, A, S>(orchestrator: &BuildOrchestrator<B, A, S>) -> String
where
    B: PlatformBackend,
    A: ArchiveService,
    S: SigningService,
{
    let total = orchestrator.config().definitions.len();
    let cursor = orchestrator.cursor();
    match orchestrator.current_definition() {
        Some(def) if orchestrator.is_running() => format!(
            "[{}/{total}] {}: {}",
            cursor.index + 1,
            def.name,
            cursor.step.label()
        ),
        _ => orchestrator.current_result().summary(),
    }
}

fn report(result: &BatchResult, output: &OutputConfig) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    if !output.show_text() {
        return Ok(());
    }

    for outcome in &result.outcomes {
        let prefix = match outcome.status {
            DefinitionStatus::Succeeded => status::SUCCESS,
            DefinitionStatus::Failed => status::ERROR,
            DefinitionStatus::Skipped => status::SKIPPED,
            DefinitionStatus::Canceled => status::WARNING,
        };
        match &outcome.reason {
            Some(reason) => println!("{prefix} {}: {reason}", outcome.name),
            None if outcome.status == DefinitionStatus::Skipped => {
                println!("{prefix} {} (inactive)", outcome.name);
            }
            None if outcome.status == DefinitionStatus::Canceled => {
                println!("{prefix} {} (canceled)", outcome.name);
            }
            None => println!("{prefix} {}", outcome.name),
        }
        if let Some(e) = &outcome.signing_error {
            println!("  {} signing: {e}", status::WARNING);
        }
        if let Some(e) = &outcome.archive_error {
            println!("  {} archive: {e}", status::WARNING);
        }
    }

    println!("\n{}", result.summary());
    Ok(())
}
