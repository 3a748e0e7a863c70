//! Packaging policy
//!
//! Derives the per-build packaging flags from batch policy and the
//! platform-specific session parameters from a definition's extras.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::backend::SessionValue;
use super::batch::BatchConfiguration;
use super::definition::{BuildDefinition, Platform};

/// Flags handed to the backend's build call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PackagingFlags {
    /// Fail on any missing content
    pub strict: bool,
    /// Development build (keeps debug logging, no release optimizations)
    pub development: bool,
    /// Allow a script debugger to attach
    pub allow_debugging: bool,
    /// Fast block compression
    pub fast_compression: bool,
}

impl PackagingFlags {
    /// Compute the flags for one platform under the batch policy
    pub fn for_platform(config: &BatchConfiguration, platform: Platform) -> Self {
        Self {
            strict: true,
            development: !config.optimize_for_release,
            allow_debugging: config.allow_remote_debugging,
            fast_compression: config.use_fast_compression && platform.allows_fast_compression(),
        }
    }

    /// Names of the set flags, for logs and process environments
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.strict {
            names.push("strict");
        }
        if self.development {
            names.push("development");
        }
        if self.allow_debugging {
            names.push("allow_debugging");
        }
        if self.fast_compression {
            names.push("fast_compression");
        }
        names
    }
}

/// `YY.MM` bundle version for a date
pub fn bundle_version(date: NaiveDate) -> String {
    format!("{:02}.{:02}", date.year() % 100, date.month())
}

/// Session parameters for the definition's own platform
///
/// Parameters are returned in the order they should be applied.
pub fn session_parameters(
    def: &BuildDefinition,
    config: &BatchConfiguration,
    today: NaiveDate,
) -> Vec<(&'static str, SessionValue)> {
    let extras = &def.extras;
    let text = |value: &Option<String>| SessionValue::from(value.clone().unwrap_or_default());

    let mut params = vec![
        ("bundle_version", SessionValue::from(bundle_version(today))),
        ("show_splash", SessionValue::from(def.show_platform_splash)),
    ];

    match def.platform {
        Platform::XboxOne => {
            let subtarget = if config.optimize_for_release {
                "master"
            } else {
                "development"
            };
            params.extend([
                ("subtarget", SessionValue::from(subtarget)),
                ("deploy_method", SessionValue::from("package")),
                (
                    "streaming_install_launch_range",
                    SessionValue::Number(i64::try_from(config.content.len()).unwrap_or(i64::MAX)),
                ),
                ("version", text(&extras.version)),
            ]);
        }
        Platform::Switch => {
            let app_id = extras.app_id.clone().unwrap_or_default();
            params.extend([
                ("create_rom_file", SessionValue::from(true)),
                ("create_solution_file", SessionValue::from(false)),
                (
                    "release_version",
                    SessionValue::from(extras.release_number.to_string()),
                ),
                (
                    "display_version",
                    SessionValue::from(format!("1.0.{}", extras.release_number)),
                ),
                ("application_id", SessionValue::from(app_id.clone())),
                ("presence_group_id", SessionValue::from(app_id.clone())),
                ("local_communication_ids", SessionValue::List(vec![app_id])),
            ]);
        }
        Platform::Ps4 => {
            params.extend([
                ("compress_files_in_package", SessionValue::from(true)),
                ("compress_with_psarc", SessionValue::from(true)),
                ("build_subtarget", text(&extras.package_type)),
                (
                    "parental_level",
                    SessionValue::from(extras.parental_level.unwrap_or_default()),
                ),
                ("master_version", text(&extras.version)),
                ("content_id", text(&extras.app_id)),
                ("title_data_path", text(&extras.title_data_path)),
                (
                    "default_age_restriction",
                    SessionValue::from(extras.default_age_restriction.unwrap_or_default()),
                ),
                (
                    "age_restrictions",
                    SessionValue::List(
                        extras
                            .age_restrictions
                            .iter()
                            .map(|r| format!("{}={}", r.region, r.age))
                            .collect(),
                    ),
                ),
            ]);
        }
        _ => {}
    }

    params
}
