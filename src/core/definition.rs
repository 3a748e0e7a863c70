//! Build definition data model
//!
//! A [`BuildDefinition`] describes one target build within a batch: the
//! platform it targets, where its artifact goes, the feature symbols it
//! compiles with and what happens after packaging.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Coarse platform family used for symbol tables and target switching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformGroup {
    /// Desktop players (Windows, macOS, Linux)
    Standalone,
    /// iOS
    Ios,
    /// Android
    Android,
    /// WebGL
    #[serde(rename = "webgl")]
    WebGl,
    /// Xbox One
    XboxOne,
    /// Nintendo Switch
    Switch,
    /// PlayStation 4
    #[serde(rename = "ps4")]
    Ps4,
}

impl PlatformGroup {
    /// Identifier used in logs and settings files
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Ios => "ios",
            Self::Android => "android",
            Self::WebGl => "webgl",
            Self::XboxOne => "xbox_one",
            Self::Switch => "switch",
            Self::Ps4 => "ps4",
        }
    }
}

impl fmt::Display for PlatformGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specific build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// 64-bit Windows player
    Windows64,
    /// macOS player
    #[serde(rename = "macos")]
    MacOs,
    /// 64-bit Linux player
    Linux64,
    /// iOS (exports a project bundle)
    Ios,
    /// Android
    Android,
    /// WebGL (exports a site directory)
    #[serde(rename = "webgl")]
    WebGl,
    /// Xbox One package
    XboxOne,
    /// Nintendo Switch ROM
    Switch,
    /// PlayStation 4 package
    #[serde(rename = "ps4")]
    Ps4,
}

impl Platform {
    /// Identifier used in logs, settings files and asset manifest paths
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows64 => "windows64",
            Self::MacOs => "macos",
            Self::Linux64 => "linux64",
            Self::Ios => "ios",
            Self::Android => "android",
            Self::WebGl => "webgl",
            Self::XboxOne => "xbox_one",
            Self::Switch => "switch",
            Self::Ps4 => "ps4",
        }
    }

    /// The family this platform belongs to
    pub fn group(self) -> PlatformGroup {
        match self {
            Self::Windows64 | Self::MacOs | Self::Linux64 => PlatformGroup::Standalone,
            Self::Ios => PlatformGroup::Ios,
            Self::Android => PlatformGroup::Android,
            Self::WebGl => PlatformGroup::WebGl,
            Self::XboxOne => PlatformGroup::XboxOne,
            Self::Switch => PlatformGroup::Switch,
            Self::Ps4 => PlatformGroup::Ps4,
        }
    }

    /// Whether the build produces a package directory rather than one file
    ///
    /// For these platforms the definition's output filename is ignored.
    pub fn produces_bundle(self) -> bool {
        matches!(self, Self::Ios | Self::WebGl | Self::XboxOne | Self::Ps4)
    }

    /// Whether produced artifacts can be code-signed
    pub fn supports_signing(self) -> bool {
        matches!(self, Self::MacOs)
    }

    /// Whether the packager accepts fast block compression
    pub fn allows_fast_compression(self) -> bool {
        !matches!(self, Self::XboxOne)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full target identity handed to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    /// Platform family
    pub group: PlatformGroup,
    /// Specific platform
    pub platform: Platform,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.platform)
    }
}

/// A named compile-time feature flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol name
    pub name: String,
    /// Whether the symbol is defined
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Symbol {
    /// Create an active symbol
    pub fn active(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
        }
    }

    /// Create an inactive symbol
    pub fn inactive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: false,
        }
    }
}

/// Minimum age for one rating region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRestriction {
    /// Rating region code
    pub region: String,
    /// Minimum age
    pub age: u32,
}

/// Platform-specific fields, passed through to the backend verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformExtras {
    /// Product version string
    #[serde(default)]
    pub version: Option<String>,

    /// Application / content identifier
    #[serde(default)]
    pub app_id: Option<String>,

    /// Numeric release counter
    #[serde(default)]
    pub release_number: u32,

    /// Path to the title data file
    #[serde(default)]
    pub title_data_path: Option<String>,

    /// Package subtarget (e.g. "package", "iso")
    #[serde(default)]
    pub package_type: Option<String>,

    /// Parental control level
    #[serde(default)]
    pub parental_level: Option<u32>,

    /// Default minimum age
    #[serde(default)]
    pub default_age_restriction: Option<u32>,

    /// Per-region age ratings
    #[serde(default)]
    pub age_restrictions: Vec<AgeRestriction>,
}

/// One target build within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDefinition {
    /// Human-readable name (not required to be unique)
    pub name: String,

    /// Inactive definitions are skipped entirely
    #[serde(default = "default_true")]
    pub active: bool,

    /// Specific target platform
    pub platform: Platform,

    /// Platform family (defaults to the platform's own family)
    #[serde(default)]
    pub group: Option<PlatformGroup>,

    /// Directory the artifact is written to (wiped before each build)
    #[serde(default)]
    pub output_directory: String,

    /// Artifact filename inside the output directory
    #[serde(default)]
    pub output_filename: String,

    /// Definition-level feature symbols
    #[serde(default)]
    pub symbols: Vec<Symbol>,

    /// Compress the output directory after a successful build
    #[serde(default)]
    pub archive_after_build: bool,

    /// Show the platform splash screen
    #[serde(default)]
    pub show_platform_splash: bool,

    /// Code-sign the artifact (only on platforms that support it)
    #[serde(default)]
    pub sign: bool,

    /// Platform-specific pass-through fields
    #[serde(flatten)]
    pub extras: PlatformExtras,
}

fn default_true() -> bool {
    true
}

impl BuildDefinition {
    /// Create an active definition with defaults for everything else
    pub fn new(name: impl Into<String>, platform: Platform, output_directory: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            platform,
            group: None,
            output_directory: output_directory.into(),
            output_filename: String::new(),
            symbols: Vec::new(),
            archive_after_build: false,
            show_platform_splash: false,
            sign: false,
            extras: PlatformExtras::default(),
        }
    }

    /// Declared platform group, falling back to the platform's family
    pub fn group(&self) -> PlatformGroup {
        self.group.unwrap_or_else(|| self.platform.group())
    }

    /// Target identity for the backend
    pub fn target(&self) -> Target {
        Target {
            group: self.group(),
            platform: self.platform,
        }
    }

    /// Output directory as a path
    pub fn output_dir(&self) -> &Path {
        Path::new(&self.output_directory)
    }

    /// Where the backend writes the artifact
    ///
    /// Bundle-producing platforms (and an empty filename) use the output
    /// directory itself.
    pub fn build_location(&self) -> PathBuf {
        if self.platform.produces_bundle() || self.output_filename.is_empty() {
            self.output_dir().to_path_buf()
        } else {
            self.output_dir().join(&self.output_filename)
        }
    }

    /// Whether this definition's artifact should be code-signed
    pub fn wants_signing(&self) -> bool {
        self.sign && self.platform.supports_signing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_groups() {
        assert_eq!(Platform::MacOs.group(), PlatformGroup::Standalone);
        assert_eq!(Platform::Windows64.group(), PlatformGroup::Standalone);
        assert_eq!(Platform::Ps4.group(), PlatformGroup::Ps4);
    }

    #[test]
    fn test_group_defaults_to_platform_family() {
        let def = BuildDefinition::new("win", Platform::Windows64, "out/win");
        assert_eq!(def.group(), PlatformGroup::Standalone);
        assert_eq!(
            def.target(),
            Target {
                group: PlatformGroup::Standalone,
                platform: Platform::Windows64
            }
        );
    }

    #[test]
    fn test_build_location_joins_filename() {
        let mut def = BuildDefinition::new("win", Platform::Windows64, "out/win");
        def.output_filename = "Game.exe".to_string();
        assert_eq!(def.build_location(), PathBuf::from("out/win/Game.exe"));
    }

    #[test]
    fn test_build_location_ignores_filename_for_bundles() {
        let mut def = BuildDefinition::new("ios", Platform::Ios, "out/ios");
        def.output_filename = "ignored".to_string();
        assert_eq!(def.build_location(), PathBuf::from("out/ios"));
    }

    #[test]
    fn test_signing_only_where_supported() {
        let mut mac = BuildDefinition::new("mac", Platform::MacOs, "out/mac");
        mac.sign = true;
        assert!(mac.wants_signing());

        let mut win = BuildDefinition::new("win", Platform::Windows64, "out/win");
        win.sign = true;
        assert!(!win.wants_signing());
    }

    #[test]
    fn test_deserialize_minimal_definition() {
        let def: BuildDefinition = toml::from_str(
            r#"
name = "Switch"
platform = "switch"
output_directory = "Builds/Switch"
app_id = "0x0100"
release_number = 4
"#,
        )
        .unwrap();

        assert!(def.active);
        assert_eq!(def.platform, Platform::Switch);
        assert_eq!(def.extras.app_id.as_deref(), Some("0x0100"));
        assert_eq!(def.extras.release_number, 4);
    }
}
