//! Batch build orchestration
//!
//! [`BuildOrchestrator`] is a tick-driven state machine. A host calls
//! [`BuildOrchestrator::advance_tick`] periodically; every call performs at
//! most one step of the current definition's pipeline:
//!
//! ```text
//! SetSymbols -> SwitchPlatform -> AwaitCompilation -> CopyPlatformData -> Build -> Archive
//! ```
//!
//! `AwaitCompilation` is the only step that can occupy several ticks: it
//! polls the backend until compilation settles. `Build` and `Archive` block
//! for the duration of the backend or archive call.
//!
//! Per-definition errors never escape a tick. They are recorded in the
//! [`BatchResult`] and the run moves on to the next definition. Only a
//! backend-reported cancellation or an external stop request ends a run
//! early.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::backend::{
    ArchiveService, BuildOutcome, BuildRequest, PlatformBackend, SigningService,
};
use super::batch::BatchConfiguration;
use super::definition::BuildDefinition;
use super::packaging::{self, PackagingFlags};
use super::result::{BatchResult, DefinitionOutcome, DefinitionStatus};
use super::{symbols, validate};
use crate::config::defaults::{ARCHIVE_EXTENSION, ASSET_MANIFEST_ROOT};
use crate::error::{BackendError, OrchestratorError, SigningError};
use crate::infra::filesystem;

/// Run-level state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run started yet
    Idle,
    /// Definitions are being processed
    Running,
    /// Every definition was processed
    Completed,
    /// The run was aborted
    Canceled,
}

/// Pipeline step of the current definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Validate and install feature symbols
    SetSymbols,
    /// Ask the backend to switch target
    SwitchPlatform,
    /// Poll until compilation settles
    AwaitCompilation,
    /// Stage platform-specific data
    CopyPlatformData,
    /// Package the artifact
    Build,
    /// Compress the output directory
    Archive,
}

impl Step {
    /// Short label for progress output
    pub fn label(self) -> &'static str {
        match self {
            Self::SetSymbols => "setting symbols",
            Self::SwitchPlatform => "switching platform",
            Self::AwaitCompilation => "compiling",
            Self::CopyPlatformData => "staging data",
            Self::Build => "building",
            Self::Archive => "archiving",
        }
    }
}

/// Position of the run: which definition, which step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Index into the batch's definitions
    pub index: usize,
    /// Current step of that definition
    pub step: Step,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            index: 0,
            step: Step::SetSymbols,
        }
    }
}

/// Receives the final result once per run
pub trait RunListener: Send {
    /// Called exactly once when a run reaches a terminal state
    fn on_complete(&mut self, result: &BatchResult);
}

impl<F> RunListener for F
where
    F: FnMut(&BatchResult) + Send,
{
    fn on_complete(&mut self, result: &BatchResult) {
        self(result);
    }
}

/// Cloneable handle for requesting a stop from another thread
///
/// A stop is honored at the start of the next tick. A backend call already
/// in flight is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request the current run to stop
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Derive the archive path for an output directory
///
/// A single trailing separator is stripped before the extension is appended:
/// `Builds/Foo/` becomes `Builds/Foo.zip`.
pub fn archive_path(output_directory: &str) -> PathBuf {
    let trimmed = output_directory
        .strip_suffix('/')
        .or_else(|| output_directory.strip_suffix('\\'))
        .unwrap_or(output_directory);
    PathBuf::from(format!("{trimmed}.{ARCHIVE_EXTENSION}"))
}

/// Sequential batch build state machine
pub struct BuildOrchestrator<B, A, S> {
    backend: B,
    archiver: A,
    signer: S,
    config: Arc<BatchConfiguration>,
    state: RunState,
    cursor: Cursor,
    result: BatchResult,
    started: Option<Instant>,
    stop: StopHandle,
    listener: Option<Box<dyn RunListener>>,
}

impl<B, A, S> BuildOrchestrator<B, A, S>
where
    B: PlatformBackend,
    A: ArchiveService,
    S: SigningService,
{
    /// Create an idle orchestrator over the given collaborators
    pub fn new(backend: B, archiver: A, signer: S) -> Self {
        Self {
            backend,
            archiver,
            signer,
            config: Arc::new(BatchConfiguration::default()),
            state: RunState::Idle,
            cursor: Cursor::default(),
            result: BatchResult::default(),
            started: None,
            stop: StopHandle::default(),
            listener: None,
        }
    }

    /// Register the completion listener (replaces any previous one)
    pub fn on_complete(&mut self, listener: impl RunListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Handle for requesting a stop between ticks
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Start a run over a snapshot of `config`
    ///
    /// Rejected with [`OrchestratorError::AlreadyRunning`] while a run is in
    /// progress. A stop requested before this call does not carry over.
    pub fn start_run(&mut self, config: BatchConfiguration) -> Result<(), OrchestratorError> {
        if self.state == RunState::Running {
            return Err(OrchestratorError::AlreadyRunning);
        }

        tracing::info!(
            "Starting batch: {} definitions ({} active)",
            config.definitions.len(),
            config.active_count()
        );

        self.config = Arc::new(config);
        self.cursor = Cursor::default();
        self.result = BatchResult::default();
        self.started = Some(Instant::now());
        self.stop.clear();
        self.state = RunState::Running;
        Ok(())
    }

    /// Whether a run is in progress
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Run-level state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Current definition and step
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The configuration snapshot of the current (or last) run
    pub fn config(&self) -> &BatchConfiguration {
        &self.config
    }

    /// Definition under the cursor, if any
    pub fn current_definition(&self) -> Option<&BuildDefinition> {
        self.config.definitions.get(self.cursor.index)
    }

    /// Tally so far; elapsed time is live while running
    pub fn current_result(&self) -> BatchResult {
        let mut result = self.result.clone();
        if self.state == RunState::Running {
            if let Some(started) = self.started {
                result.elapsed = started.elapsed();
            }
        }
        result
    }

    /// The platform backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The archive service
    pub fn archiver(&self) -> &A {
        &self.archiver
    }

    /// The signing service
    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Perform one unit of work
    ///
    /// No-op unless a run is in progress.
    pub fn advance_tick(&mut self) {
        if self.state != RunState::Running {
            return;
        }

        if self.stop.is_requested() {
            tracing::warn!("Stop requested, canceling remaining builds");
            self.finish(RunState::Canceled);
            return;
        }

        let config = Arc::clone(&self.config);
        let index = self.cursor.index;

        if let Some(def) = config.definitions.get(index) {
            if def.active {
                self.run_step(index, def, &config);
            } else {
                tracing::info!("Skipping inactive definition '{}'", def.name);
                self.result.record(DefinitionOutcome::new(
                    index,
                    &def.name,
                    DefinitionStatus::Skipped,
                ));
                self.next_definition();
            }
        }

        if self.state == RunState::Running && self.cursor.index >= config.definitions.len() {
            self.finish(RunState::Completed);
        }
    }

    fn run_step(&mut self, index: usize, def: &BuildDefinition, config: &BatchConfiguration) {
        match self.cursor.step {
            Step::SetSymbols => {
                if let Err(e) = validate::validate(def) {
                    self.fail_definition(index, def, e.to_string());
                    return;
                }

                let names = symbols::active_names(&def.symbols, &config.general_symbols);
                tracing::info!("[{}] Symbols: {}", def.name, names.join(";"));
                match self.backend.set_symbols(def.group(), &names) {
                    Ok(()) => self.cursor.step = Step::SwitchPlatform,
                    Err(e) => self.fail_definition(index, def, e.to_string()),
                }
            }
            Step::SwitchPlatform => {
                tracing::info!("[{}] Switching target to {}", def.name, def.target());
                match self.backend.switch_target(def.target()) {
                    Ok(()) => self.cursor.step = Step::AwaitCompilation,
                    Err(e) => self.fail_definition(index, def, e.to_string()),
                }
            }
            Step::AwaitCompilation => {
                if self.backend.is_compiling() {
                    tracing::debug!("[{}] Waiting for compilation", def.name);
                } else {
                    self.cursor.step = Step::CopyPlatformData;
                }
            }
            Step::CopyPlatformData => match self.backend.stage_platform_data(def.platform) {
                Ok(()) => self.cursor.step = Step::Build,
                Err(e) => self.fail_definition(index, def, e.to_string()),
            },
            Step::Build => self.build(index, def, config),
            Step::Archive => {
                if def.archive_after_build {
                    self.archive(def);
                }
                self.next_definition();
            }
        }
    }

    fn build(&mut self, index: usize, def: &BuildDefinition, config: &BatchConfiguration) {
        if let Err(e) = filesystem::recreate_dir(def.output_dir()).map_err(BackendError::from) {
            self.fail_definition(index, def, e.to_string());
            return;
        }

        let today = chrono::Local::now().date_naive();
        for (key, value) in packaging::session_parameters(def, config, today) {
            if let Err(e) = self.backend.set_session_parameter(def.platform, key, &value) {
                self.fail_definition(index, def, e.to_string());
                return;
            }
        }

        let request = BuildRequest {
            location: def.build_location(),
            content: config.content.clone(),
            target: def.target(),
            flags: PackagingFlags::for_platform(config, def.platform),
            asset_manifest: Path::new(ASSET_MANIFEST_ROOT)
                .join(def.platform.as_str())
                .join(format!("{}.manifest", def.platform)),
        };

        tracing::info!(
            "Starting build {} ({})",
            def.name,
            request.flags.names().join(", ")
        );

        let report = match self.backend.build(&request) {
            Ok(report) => report,
            Err(e) => {
                self.fail_definition(index, def, e.to_string());
                return;
            }
        };

        let mut outcome = DefinitionOutcome::new(index, &def.name, DefinitionStatus::Succeeded);
        outcome.error_count = report.error_count;
        outcome.warning_count = report.warning_count;

        match report.outcome {
            BuildOutcome::Succeeded => {
                tracing::info!("Finished build {}", def.name);
                if def.wants_signing() {
                    if let Err(e) = self.sign(config, &request.location) {
                        tracing::warn!("Signing {} failed: {}", def.name, e);
                        outcome.signing_error = Some(e.to_string());
                    }
                }
                self.result.record(outcome);
                self.cursor.step = Step::Archive;
            }
            BuildOutcome::Failed => {
                tracing::error!(
                    "Error while building {}, {} errors, {} warnings",
                    def.name,
                    report.error_count,
                    report.warning_count
                );
                outcome.status = DefinitionStatus::Failed;
                outcome.reason = Some(format!(
                    "build failed with {} errors, {} warnings",
                    report.error_count, report.warning_count
                ));
                self.result.record(outcome);
                self.next_definition();
            }
            BuildOutcome::Cancelled => {
                tracing::warn!("Canceled batch build on {}", def.name);
                outcome.status = DefinitionStatus::Canceled;
                self.result.record(outcome);
                self.finish(RunState::Canceled);
            }
        }
    }

    fn sign(&mut self, config: &BatchConfiguration, artifact: &Path) -> Result<(), SigningError> {
        let identity = config
            .signing_identity
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(SigningError::MissingIdentity)?;
        tracing::info!("Signing {} as '{identity}'", artifact.display());
        self.signer.sign(identity, artifact)
    }

    fn archive(&mut self, def: &BuildDefinition) {
        let destination = archive_path(&def.output_directory);
        tracing::info!(
            "Archiving {} to {}",
            def.output_directory,
            destination.display()
        );

        if let Err(e) = self.archiver.compress(def.output_dir(), &destination) {
            tracing::warn!("Archiving {} failed: {}", def.name, e);
            if let Some(outcome) = self.result.outcomes.last_mut() {
                outcome.archive_error = Some(e.to_string());
            }
        }
    }

    fn fail_definition(&mut self, index: usize, def: &BuildDefinition, reason: String) {
        tracing::error!("Error while building {}: {}", def.name, reason);
        self.result.record(
            DefinitionOutcome::new(index, &def.name, DefinitionStatus::Failed).with_reason(reason),
        );
        self.next_definition();
    }

    fn next_definition(&mut self) {
        self.cursor.index += 1;
        self.cursor.step = Step::SetSymbols;
    }

    fn finish(&mut self, state: RunState) {
        self.state = state;
        if let Some(started) = self.started.take() {
            self.result.elapsed = started.elapsed();
        }
        self.result.canceled = state == RunState::Canceled;

        if self.result.canceled {
            tracing::warn!("Builds canceled: {}", self.result.summary());
        } else {
            tracing::info!("Builds complete: {}", self.result.summary());
        }

        if let Some(listener) = self.listener.as_mut() {
            listener.on_complete(&self.result);
        }
    }
}
