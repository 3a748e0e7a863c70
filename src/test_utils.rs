//! Test utilities
//!
//! Proptest generators plus in-memory fakes for the orchestrator's
//! collaborators.

#[cfg(test)]
pub mod generators {
    use crate::core::definition::{Platform, Symbol};
    use proptest::prelude::*;

    /// Generate a symbol name from a small pool so collisions are common
    pub fn symbol_name() -> impl Strategy<Value = String> {
        "[A-D]"
    }

    /// Generate a symbol with random activation
    pub fn symbol() -> impl Strategy<Value = Symbol> {
        (symbol_name(), prop::bool::ANY).prop_map(|(name, active)| Symbol { name, active })
    }

    /// Generate any platform
    pub fn platform() -> impl Strategy<Value = Platform> {
        prop_oneof![
            Just(Platform::Windows64),
            Just(Platform::MacOs),
            Just(Platform::Linux64),
            Just(Platform::Ios),
            Just(Platform::Android),
            Just(Platform::WebGl),
            Just(Platform::XboxOne),
            Just(Platform::Switch),
            Just(Platform::Ps4),
        ]
    }

    /// Generate a relative output directory, optionally with a trailing separator
    pub fn output_directory() -> impl Strategy<Value = String> {
        ("[A-Za-z][A-Za-z0-9_]{0,12}", "[A-Za-z][A-Za-z0-9_]{0,12}", prop::bool::ANY).prop_map(
            |(root, leaf, trailing)| {
                let sep = if trailing { "/" } else { "" };
                format!("{root}/{leaf}{sep}")
            },
        )
    }
}

#[cfg(test)]
pub mod fakes {
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};

    use crate::core::backend::{
        ArchiveService, BuildReport, BuildRequest, PlatformBackend, SessionValue, SigningService,
    };
    use crate::core::definition::{Platform, PlatformGroup, Target};
    use crate::error::{ArchiveError, BackendError, SigningError};

    /// A recorded backend call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        SetSymbols(Vec<String>),
        SwitchTarget(Target),
        IsCompiling,
        StagePlatformData(Platform),
        SetSessionParameter(String, String),
        Build(PathBuf),
    }

    /// Scriptable backend that records every call
    #[derive(Debug, Default)]
    pub struct FakeBackend {
        calls: Vec<Call>,
        builds: Vec<BuildRequest>,
        compiling_polls: usize,
        reports: VecDeque<BuildReport>,
        failing_switch: Option<usize>,
        switches: usize,
    }

    impl FakeBackend {
        /// Report compiling for the next `polls` polls
        pub fn compiling_for(mut self, polls: usize) -> Self {
            self.compiling_polls = polls;
            self
        }

        /// Return these reports from successive builds; later builds succeed
        pub fn with_reports(mut self, reports: Vec<BuildReport>) -> Self {
            self.reports = reports.into();
            self
        }

        /// Fail the `nth` target switch (zero-based)
        pub fn failing_switch_at(mut self, nth: usize) -> Self {
            self.failing_switch = Some(nth);
            self
        }

        pub fn calls(&self) -> &[Call] {
            &self.calls
        }

        pub fn builds(&self) -> &[BuildRequest] {
            &self.builds
        }
    }

    impl PlatformBackend for FakeBackend {
        fn set_symbols(
            &mut self,
            _group: PlatformGroup,
            symbols: &[String],
        ) -> Result<(), BackendError> {
            self.calls.push(Call::SetSymbols(symbols.to_vec()));
            Ok(())
        }

        fn switch_target(&mut self, target: Target) -> Result<(), BackendError> {
            self.calls.push(Call::SwitchTarget(target));
            let nth = self.switches;
            self.switches += 1;
            if self.failing_switch == Some(nth) {
                return Err(BackendError::StepFailed {
                    step: "switch".to_string(),
                    message: "editor crashed".to_string(),
                });
            }
            Ok(())
        }

        fn is_compiling(&mut self) -> bool {
            self.calls.push(Call::IsCompiling);
            if self.compiling_polls > 0 {
                self.compiling_polls -= 1;
                true
            } else {
                false
            }
        }

        fn stage_platform_data(&mut self, platform: Platform) -> Result<(), BackendError> {
            self.calls.push(Call::StagePlatformData(platform));
            Ok(())
        }

        fn set_session_parameter(
            &mut self,
            _platform: Platform,
            key: &str,
            value: &SessionValue,
        ) -> Result<(), BackendError> {
            self.calls
                .push(Call::SetSessionParameter(key.to_string(), value.to_string()));
            Ok(())
        }

        fn build(&mut self, request: &BuildRequest) -> Result<BuildReport, BackendError> {
            self.calls.push(Call::Build(request.location.clone()));
            self.builds.push(request.clone());
            Ok(self.reports.pop_front().unwrap_or_else(BuildReport::succeeded))
        }
    }

    /// Archive service that records `(source, destination)` pairs
    #[derive(Debug, Default)]
    pub struct FakeArchiver {
        calls: Vec<(PathBuf, PathBuf)>,
        fail: bool,
    }

    impl FakeArchiver {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> &[(PathBuf, PathBuf)] {
            &self.calls
        }
    }

    impl ArchiveService for FakeArchiver {
        fn compress(&mut self, source: &Path, destination: &Path) -> Result<(), ArchiveError> {
            self.calls
                .push((source.to_path_buf(), destination.to_path_buf()));
            if self.fail {
                return Err(ArchiveError::Failed {
                    source_dir: source.to_path_buf(),
                    error: "disk full".to_string(),
                });
            }
            Ok(())
        }
    }

    /// Signing service that records `(identity, artifact)` pairs
    #[derive(Debug, Default)]
    pub struct FakeSigner {
        calls: Vec<(String, PathBuf)>,
        fail: bool,
    }

    impl FakeSigner {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> &[(String, PathBuf)] {
            &self.calls
        }
    }

    impl SigningService for FakeSigner {
        fn sign(&mut self, identity: &str, artifact: &Path) -> Result<(), SigningError> {
            self.calls.push((identity.to_string(), artifact.to_path_buf()));
            if self.fail {
                return Err(SigningError::Failed {
                    artifact: artifact.to_path_buf(),
                    error: "identity not in keychain".to_string(),
                });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_output_directory_generator(dir in output_directory()) {
            prop_assert!(dir.contains('/'));
            prop_assert!(!dir.trim().is_empty());
        }
    }
}
