//! Making sure arduino-cli is installed.
//!
//! arduino-cli is distributed through Homebrew on macOS and Linux. Before a
//! session is built the formula is queried, and installed when missing.

use crate::process::{
    BINARY_NAME, INSTALL_DIRS, ProcessRunner, SystemRunner, locate_binary,
};
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A system package manager able to provide arduino-cli.
pub trait PackageManager: Send + Sync {
    /// Check whether `formula` is installed.
    fn is_installed(&self, formula: &str) -> Result<bool>;

    /// Install `formula`.
    fn install(&self, formula: &str) -> Result<()>;
}

/// Install arduino-cli through `manager` unless it is already present.
///
/// Returns `true` when an install was performed.
pub fn ensure_installed(manager: &dyn PackageManager) -> Result<bool> {
    if manager.is_installed(BINARY_NAME)? {
        tracing::debug!("arduino-cli already installed");
        return Ok(false);
    }

    tracing::info!("arduino-cli not installed, installing with package manager");
    manager.install(BINARY_NAME)?;
    Ok(true)
}

/// Homebrew, driven through the `brew` executable.
#[derive(Clone)]
pub struct Homebrew {
    program: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl std::fmt::Debug for Homebrew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Homebrew")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl Homebrew {
    /// Use the `brew` executable at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_runner(program, Arc::new(SystemRunner))
    }

    pub fn with_runner(program: impl Into<PathBuf>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    /// Find `brew` in the Homebrew prefixes or `PATH`.
    ///
    /// # Errors
    /// - `PackageManager` if Homebrew is not installed
    pub fn locate() -> Result<Self> {
        let dirs: Vec<PathBuf> = INSTALL_DIRS.iter().map(PathBuf::from).collect();
        match locate_binary("brew", &dirs) {
            Ok(program) => Ok(Self::new(program)),
            Err(_) => Err(Error::PackageManager(
                "brew not found; install Homebrew from https://brew.sh".to_string(),
            )),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn brew(&self, args: &[&str]) -> Result<Option<i32>> {
        let args: Vec<OsString> = args.iter().map(OsString::from).collect();
        tracing::debug!(program = %self.program.display(), args = ?args, "running brew");

        let output = self.runner.run(&self.program, &args).map_err(|e| {
            Error::PackageManager(format!("failed to run {}: {}", self.program.display(), e))
        })?;
        Ok(output.code)
    }
}

impl PackageManager for Homebrew {
    fn is_installed(&self, formula: &str) -> Result<bool> {
        match self.brew(&["list", "--formula", formula])? {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => Err(Error::PackageManager(format!(
                "brew list exited with {:?}",
                code
            ))),
        }
    }

    fn install(&self, formula: &str) -> Result<()> {
        match self.brew(&["install", formula])? {
            Some(0) => {
                tracing::info!(formula, "installed with Homebrew");
                Ok(())
            }
            code => Err(Error::PackageManager(format!(
                "brew install {} exited with {:?}",
                formula, code
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessOutput;
    use crate::test_utils::RecordingRunner;
    use std::io;
    use std::sync::Mutex;

    fn brew(runner: &Arc<RecordingRunner>) -> Homebrew {
        Homebrew::with_runner("/opt/homebrew/bin/brew", runner.clone())
    }

    #[test]
    fn test_is_installed_exit_zero() {
        let runner = RecordingRunner::succeeding(b"arduino-cli\n");
        assert!(brew(&runner).is_installed("arduino-cli").unwrap());
        assert_eq!(
            runner.single_call(),
            vec!["list", "--formula", "arduino-cli"]
        );
    }

    #[test]
    fn test_is_installed_exit_one() {
        let runner = RecordingRunner::failing(1, b"");
        assert!(!brew(&runner).is_installed("arduino-cli").unwrap());
    }

    #[test]
    fn test_is_installed_other_exit_is_error() {
        let runner = RecordingRunner::failing(127, b"");
        let err = brew(&runner).is_installed("arduino-cli").unwrap_err();
        assert!(matches!(err, Error::PackageManager(_)));
    }

    #[test]
    fn test_install_failure_is_package_manager_error() {
        let runner = RecordingRunner::failing(1, b"");
        let err = brew(&runner).install("arduino-cli").unwrap_err();
        assert!(matches!(err, Error::PackageManager(_)));
        assert_eq!(runner.single_call(), vec!["install", "arduino-cli"]);
    }

    struct Unlaunchable;

    impl ProcessRunner for Unlaunchable {
        fn run(&self, _program: &Path, _args: &[OsString]) -> io::Result<ProcessOutput> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no brew"))
        }
    }

    #[test]
    fn test_launch_failure_is_package_manager_error() {
        let homebrew = Homebrew::with_runner("/nowhere/brew", Arc::new(Unlaunchable));
        let err = homebrew.is_installed("arduino-cli").unwrap_err();
        assert!(matches!(err, Error::PackageManager(_)));
    }

    /// Package manager that reports a fixed install state and counts installs.
    struct FakeManager {
        installed: bool,
        installs: Mutex<u32>,
    }

    impl PackageManager for FakeManager {
        fn is_installed(&self, _formula: &str) -> Result<bool> {
            Ok(self.installed)
        }

        fn install(&self, formula: &str) -> Result<()> {
            assert_eq!(formula, "arduino-cli");
            *self.installs.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[test]
    fn test_ensure_installed_skips_when_present() {
        let manager = FakeManager {
            installed: true,
            installs: Mutex::new(0),
        };
        assert!(!ensure_installed(&manager).unwrap());
        assert_eq!(*manager.installs.lock().unwrap(), 0);
    }

    #[test]
    fn test_ensure_installed_installs_when_missing() {
        let manager = FakeManager {
            installed: false,
            installs: Mutex::new(0),
        };
        assert!(ensure_installed(&manager).unwrap());
        assert_eq!(*manager.installs.lock().unwrap(), 1);
    }
}
