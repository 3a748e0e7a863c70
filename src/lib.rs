//! Buildbatch - sequential multi-platform build orchestrator
//!
//! This library drives an ordered batch of build definitions through a
//! platform backend one step at a time, tallying successes and failures and
//! optionally signing and archiving each artifact.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Batch model and orchestration logic
//! - [`infra`] - Infrastructure layer (filesystem, external processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
