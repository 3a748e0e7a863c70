//! Core business logic module
//!
//! Batch model, packaging policy and the build orchestrator. Process and
//! filesystem side effects beyond output directory preparation belong in
//! [`crate::infra`].
//!
//! # Submodules
//!
//! - [`definition`] - Build definitions, platforms and symbols
//! - [`batch`] - Batch configuration and settings files
//! - [`symbols`] - Feature symbol merging
//! - [`validate`] - Per-definition validation
//! - [`packaging`] - Packaging flags and platform session parameters
//! - [`backend`] - Collaborator traits consumed by the orchestrator
//! - [`orchestrator`] - Tick-driven batch state machine
//! - [`result`] - Run tallies and per-definition outcomes
//! - [`check`] - Dry-run validation of a settings file
//! - [`global_config`] - Global configuration management

pub mod backend;
pub mod batch;
pub mod check;
pub mod definition;
pub mod global_config;
pub mod orchestrator;
pub mod packaging;
pub mod result;
pub mod symbols;
pub mod validate;
