//! The library entry point.
//!
//! [`ArduinoCli`] owns one [`Invoker`] (binary path plus global options) and,
//! optionally, the daemon it started. Command groups are borrowed views over
//! the invoker, so a session can be shared freely once built.

use crate::commands::board::Board;
use crate::commands::build::{
    Build, BurnBootloaderOptions, CompileOptions, DebugOptions, MonitorOptions, UploadOptions,
};
use crate::commands::config::Config;
use crate::commands::core::Core;
use crate::commands::library::Lib;
use crate::commands::maintenance::{Maintenance, Shell};
use crate::commands::sketch::Sketch;
use crate::commands::PostInstallOptions;
use crate::daemon::{DEFAULT_DAEMON_PORT, DaemonHandle, DaemonOptions, is_listening};
use crate::install::{Homebrew, PackageManager, ensure_installed};
use crate::process::{GlobalOptions, Invoker, ProcessRunner, SystemRunner, locate_arduino_cli};
use crate::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builder for [`ArduinoCli`].
///
/// Defaults: install check on (through Homebrew), binary located on disk,
/// daemon started on port 50051 unless one is already listening.
pub struct ArduinoCliBuilder {
    globals: GlobalOptions,
    program: Option<PathBuf>,
    runner: Option<Arc<dyn ProcessRunner>>,
    package_manager: Option<Box<dyn PackageManager>>,
    check_install: bool,
    daemon: Option<DaemonOptions>,
}

impl Default for ArduinoCliBuilder {
    fn default() -> Self {
        Self {
            globals: GlobalOptions::new(),
            program: None,
            runner: None,
            package_manager: None,
            check_install: true,
            daemon: Some(DaemonOptions::default()),
        }
    }
}

impl ArduinoCliBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Global options appended to every invocation.
    pub fn globals(mut self, globals: GlobalOptions) -> Self {
        self.globals = globals;
        self
    }

    /// Use this arduino-cli executable instead of searching for one.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Run commands through a custom process runner.
    pub fn runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Use a package manager other than Homebrew for the install check.
    pub fn package_manager(mut self, manager: Box<dyn PackageManager>) -> Self {
        self.package_manager = Some(manager);
        self
    }

    /// Turn the install check on or off.
    pub fn check_install(mut self, enabled: bool) -> Self {
        self.check_install = enabled;
        self
    }

    /// Start the daemon with these options when building.
    pub fn daemon(mut self, options: DaemonOptions) -> Self {
        self.daemon = Some(options);
        self
    }

    /// Do not start a daemon.
    pub fn no_daemon(mut self) -> Self {
        self.daemon = None;
        self
    }

    /// Run the install check, locate the binary and start the daemon.
    ///
    /// # Errors
    /// - `PackageManager` if the install check or install fails
    /// - `BinaryNotFound` if arduino-cli cannot be located
    /// - `Launch` if the daemon cannot be spawned
    pub fn build(self) -> Result<ArduinoCli> {
        if self.check_install {
            match self.package_manager {
                Some(manager) => ensure_installed(manager.as_ref())?,
                None => ensure_installed(&Homebrew::locate()?)?,
            };
        }

        let program = match self.program {
            Some(program) => program,
            None => locate_arduino_cli()?,
        };
        let runner = self.runner.unwrap_or_else(|| Arc::new(SystemRunner));
        let invoker = Invoker::with_runner(program, self.globals, runner);

        let daemon_port = self
            .daemon
            .as_ref()
            .map_or(DEFAULT_DAEMON_PORT, DaemonOptions::effective_port);

        let daemon = match self.daemon {
            Some(_) if is_listening(daemon_port) => {
                tracing::debug!(port = daemon_port, "daemon already listening, not starting another");
                None
            }
            Some(options) => Some(DaemonHandle::start(&invoker, &options)?),
            None => None,
        };

        Ok(ArduinoCli {
            invoker,
            daemon,
            daemon_port,
        })
    }
}

/// A configured arduino-cli session.
#[derive(Debug)]
pub struct ArduinoCli {
    invoker: Invoker,
    daemon: Option<DaemonHandle>,
    daemon_port: u16,
}

impl ArduinoCli {
    pub fn builder() -> ArduinoCliBuilder {
        ArduinoCliBuilder::new()
    }

    /// Build a session with the default settings.
    pub fn new() -> Result<Self> {
        ArduinoCliBuilder::new().build()
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    pub fn board(&self) -> Board<'_> {
        Board::new(&self.invoker)
    }

    pub fn config(&self) -> Config<'_> {
        Config::new(&self.invoker)
    }

    pub fn core(&self) -> Core<'_> {
        Core::new(&self.invoker)
    }

    pub fn lib(&self) -> Lib<'_> {
        Lib::new(&self.invoker)
    }

    pub fn sketch(&self) -> Sketch<'_> {
        Sketch::new(&self.invoker)
    }

    pub fn build(&self) -> Build<'_> {
        Build::new(&self.invoker)
    }

    pub fn maintenance(&self) -> Maintenance<'_> {
        Maintenance::new(&self.invoker)
    }

    /// Run an arbitrary subcommand, e.g. `["lib", "install", "wordwrap"]`.
    pub fn run<I, S>(&self, args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.invoker.run(args)
    }

    pub fn burn_bootloader(&self, options: &BurnBootloaderOptions) -> Result<Vec<u8>> {
        self.build().burn_bootloader(options)
    }

    pub fn cache_clean(&self) -> Result<Vec<u8>> {
        self.maintenance().cache_clean()
    }

    pub fn compile(&self, options: &CompileOptions) -> Result<Vec<u8>> {
        self.build().compile(options)
    }

    pub fn completion(
        &self,
        shell: Shell,
        no_descriptions: bool,
        output: Option<&Path>,
    ) -> Result<Vec<u8>> {
        self.maintenance().completion(shell, no_descriptions, output)
    }

    pub fn debug(&self, options: &DebugOptions) -> Result<Vec<u8>> {
        self.build().debug(options)
    }

    pub fn monitor(&self, options: &MonitorOptions) -> Result<Vec<u8>> {
        self.build().monitor(options)
    }

    pub fn outdated(&self) -> Result<Vec<u8>> {
        self.maintenance().outdated()
    }

    pub fn update(&self, show_outdated: bool) -> Result<Vec<u8>> {
        self.maintenance().update(show_outdated)
    }

    pub fn upgrade(&self, options: &PostInstallOptions) -> Result<Vec<u8>> {
        self.maintenance().upgrade(options)
    }

    pub fn upload(&self, options: &UploadOptions) -> Result<Vec<u8>> {
        self.build().upload(options)
    }

    pub fn version(&self) -> Result<Vec<u8>> {
        self.maintenance().version()
    }

    /// The daemon this session started, if any.
    pub fn daemon(&self) -> Option<&DaemonHandle> {
        self.daemon.as_ref()
    }

    /// Check whether a daemon accepts connections on the session's daemon port,
    /// whether or not this session started it.
    pub fn is_daemon_running(&self) -> bool {
        match self.daemon {
            Some(ref handle) => handle.is_running(),
            None => is_listening(self.daemon_port),
        }
    }

    /// Stop the daemon this session started. Does nothing otherwise.
    pub fn stop(&self) {
        if let Some(ref handle) = self.daemon {
            handle.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::commands::library::InstallOptions;
    use crate::process::OutputFormat;
    use crate::test_utils::RecordingRunner;
    use std::net::TcpListener;
    use std::sync::Mutex;

    fn offline(runner: &Arc<RecordingRunner>) -> ArduinoCliBuilder {
        ArduinoCliBuilder::new()
            .program("arduino-cli")
            .runner(runner.clone())
            .check_install(false)
            .no_daemon()
    }

    #[test]
    fn test_lib_install_wordwrap() {
        let runner = RecordingRunner::succeeding(b"ok");
        let cli = offline(&runner).build().unwrap();

        let out = cli
            .lib()
            .install("wordwrap", &InstallOptions::default())
            .unwrap();

        assert_eq!(out, b"ok");
        assert_eq!(runner.single_call(), vec!["lib", "install", "wordwrap"]);
    }

    #[test]
    fn test_nonzero_exit_is_command_failed() {
        let runner = RecordingRunner::failing(1, b"");
        let cli = offline(&runner).build().unwrap();

        let err = cli.run(["lib", "install", "wordwrap"]).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { code: Some(1) }));
    }

    #[test]
    fn test_globals_appended_to_every_command() {
        let runner = RecordingRunner::succeeding(b"");
        let globals = GlobalOptions {
            config_file: Some(PathBuf::from("/etc/arduino-cli.yaml")),
            format: Some(OutputFormat::Json),
            ..Default::default()
        };
        let cli = offline(&runner).globals(globals).build().unwrap();

        cli.version().unwrap();
        cli.core().update_index().unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                vec!["version", "--config-file", "/etc/arduino-cli.yaml", "--format", "json"],
                vec![
                    "core",
                    "update-index",
                    "--config-file",
                    "/etc/arduino-cli.yaml",
                    "--format",
                    "json"
                ],
            ]
        );
    }

    #[test]
    fn test_validation_error_makes_no_invocation() {
        let runner = RecordingRunner::succeeding(b"");
        let cli = offline(&runner).build().unwrap();

        let err = cli
            .upgrade(&PostInstallOptions {
                run_post_install: true,
                skip_post_install: true,
            })
            .unwrap_err();

        assert!(matches!(err, Error::ConflictingArgs { .. }));
        assert_eq!(runner.call_count(), 0);
    }

    struct MissingThenInstalled {
        installs: Arc<Mutex<Vec<String>>>,
    }

    impl PackageManager for MissingThenInstalled {
        fn is_installed(&self, _formula: &str) -> Result<bool> {
            Ok(!self.installs.lock().unwrap().is_empty())
        }

        fn install(&self, formula: &str) -> Result<()> {
            self.installs.lock().unwrap().push(formula.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_build_installs_missing_binary() {
        let runner = RecordingRunner::succeeding(b"");
        let installs = Arc::new(Mutex::new(Vec::new()));
        let manager = MissingThenInstalled {
            installs: installs.clone(),
        };

        offline(&runner)
            .check_install(true)
            .package_manager(Box::new(manager))
            .build()
            .unwrap();

        assert_eq!(*installs.lock().unwrap(), vec!["arduino-cli"]);
    }

    struct BrokenManager;

    impl PackageManager for BrokenManager {
        fn is_installed(&self, _formula: &str) -> Result<bool> {
            Err(Error::PackageManager("brew exploded".to_string()))
        }

        fn install(&self, _formula: &str) -> Result<()> {
            unreachable!()
        }
    }

    #[test]
    fn test_build_fails_when_install_check_fails() {
        let runner = RecordingRunner::succeeding(b"");
        let err = offline(&runner)
            .check_install(true)
            .package_manager(Box::new(BrokenManager))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::PackageManager(_)));
    }

    #[test]
    fn test_existing_daemon_is_reused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let runner = RecordingRunner::succeeding(b"");

        let cli = offline(&runner)
            .program("/nonexistent/arduino-cli")
            .daemon(DaemonOptions {
                port: Some(port),
                ..Default::default()
            })
            .build()
            .unwrap();

        assert!(cli.daemon().is_none());
        assert!(cli.is_daemon_running());
        cli.stop();
        assert!(cli.is_daemon_running());
    }

    #[cfg(unix)]
    #[test]
    #[serial_test::serial]
    fn test_daemon_started_and_stopped() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("arduino-cli");
        fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let cli = ArduinoCliBuilder::new()
            .program(&script)
            .check_install(false)
            .daemon(DaemonOptions {
                port: Some(port),
                ..Default::default()
            })
            .build()
            .unwrap();

        let handle = cli.daemon().unwrap();
        assert_eq!(handle.port(), port);
        assert!(handle.is_alive());

        cli.stop();
        assert!(!handle.is_alive());
        cli.stop();
    }

    #[test]
    fn test_daemon_launch_failure() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = ArduinoCliBuilder::new()
            .program("/nonexistent/arduino-cli")
            .check_install(false)
            .daemon(DaemonOptions {
                port: Some(port),
                ..Default::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Launch { .. }));
    }
}
