//! Batch run results
//!
//! A [`BatchResult`] is the running tally of a batch run. It is readable at
//! any time for progress reporting and is emitted once, frozen, when the run
//! reaches a terminal state.

use serde::Serialize;
use std::time::Duration;

/// Final classification of one definition within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionStatus {
    /// Built successfully
    Succeeded,
    /// Configuration error, backend error or failed build
    Failed,
    /// Inactive definition
    Skipped,
    /// Build cancelled; the run was aborted here
    Canceled,
}

/// Diagnostic record for one processed definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionOutcome {
    /// Position in the batch
    pub index: usize,
    /// Definition name
    pub name: String,
    /// Classification
    pub status: DefinitionStatus,
    /// Why the definition failed, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Errors reported by the backend
    pub error_count: u32,
    /// Warnings reported by the backend
    pub warning_count: u32,
    /// Non-fatal signing failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_error: Option<String>,
    /// Non-fatal archive failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_error: Option<String>,
}

impl DefinitionOutcome {
    /// Create an outcome with no diagnostics
    pub fn new(index: usize, name: impl Into<String>, status: DefinitionStatus) -> Self {
        Self {
            index,
            name: name.into(),
            status,
            reason: None,
            error_count: 0,
            warning_count: 0,
            signing_error: None,
            archive_error: None,
        }
    }

    /// Attach a failure reason
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Tally of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// Definitions built successfully
    pub succeeded: u32,
    /// Definitions that failed
    pub failed: u32,
    /// Inactive definitions passed over
    pub skipped: u32,
    /// Wall-clock time since the run started
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// Run aborted before every definition was processed
    pub canceled: bool,
    /// Per-definition records in processing order
    pub outcomes: Vec<DefinitionOutcome>,
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

impl BatchResult {
    /// Number of definitions counted in either tally
    pub fn processed(&self) -> u32 {
        self.succeeded + self.failed
    }

    /// Whether every processed definition succeeded and the run finished
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && !self.canceled
    }

    /// Record an outcome and update the matching counter
    pub(crate) fn record(&mut self, outcome: DefinitionOutcome) {
        match outcome.status {
            DefinitionStatus::Succeeded => self.succeeded += 1,
            DefinitionStatus::Failed => self.failed += 1,
            DefinitionStatus::Skipped => self.skipped += 1,
            DefinitionStatus::Canceled => {}
        }
        self.outcomes.push(outcome);
    }

    /// Outcome of the definition at `index`, if it has been processed
    pub fn outcome(&self, index: usize) -> Option<&DefinitionOutcome> {
        self.outcomes.iter().find(|o| o.index == index)
    }

    /// One-line summary, e.g. `2 succeeded, 1 failed (00:03:12)`
    pub fn summary(&self) -> String {
        let secs = self.elapsed.as_secs();
        let mut line = format!(
            "{} succeeded, {} failed ({:02}:{:02}:{:02})",
            self.succeeded,
            self.failed,
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        );
        if self.canceled {
            line.push_str(", canceled");
        }
        line
    }
}
