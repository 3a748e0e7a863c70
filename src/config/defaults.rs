//! Default configuration values

/// Batch settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "buildbatch.toml";

/// Global configuration file inside the config directory
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Interval between orchestrator ticks (milliseconds)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Extension appended to an output directory to name its archive
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Root of the per-platform asset manifests handed to the packager
pub const ASSET_MANIFEST_ROOT: &str = "AssetBundles";

/// Archive tool
pub const DEFAULT_ARCHIVE_PROGRAM: &str = "zip";

/// Code-signing tool
pub const DEFAULT_SIGNING_PROGRAM: &str = "codesign";

/// Exit code a build program uses to report cancellation (SIGINT convention)
pub const DEFAULT_CANCEL_EXIT_CODE: i32 = 130;
