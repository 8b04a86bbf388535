//! Locating and running the arduino-cli binary.
//!
//! Every wrapped operation ends up here: a [`CliCommand`] built by one of the
//! façades is handed to an [`Invoker`], which appends the session's
//! [`GlobalOptions`], launches the binary once, and maps the exit status.

pub mod command;
pub mod global;

pub use command::CliCommand;
pub use global::{GlobalOptions, LogFormat, LogLevel, OutputFormat};

use crate::{Error, Result};
use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Name of the wrapped executable.
pub const BINARY_NAME: &str = "arduino-cli";

/// Installation directories searched before `PATH`.
pub const INSTALL_DIRS: &[&str] = &[
    "/opt/homebrew/bin",
    "/usr/local/bin",
    "/home/linuxbrew/.linuxbrew/bin",
];

/// Exit status and captured standard output of one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or `None` when the process was terminated by a signal
    pub code: Option<i32>,
    /// Raw standard output
    pub stdout: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a program to completion.
///
/// This is the seam tests replace with a recording stub.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ProcessOutput>;
}

/// Runs programs with `std::process::Command`.
///
/// No stdin is provided, stderr is passed through to the caller's terminal and
/// the environment is inherited unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ProcessOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
        })
    }
}

/// Find an executable in `extra_dirs`, then in each `PATH` entry.
pub fn locate_binary(name: &str, extra_dirs: &[PathBuf]) -> Result<PathBuf> {
    let mut searched = extra_dirs.to_vec();
    if let Some(path) = env::var_os("PATH") {
        searched.extend(env::split_paths(&path));
    }

    for dir in &searched {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Ok(candidate);
        }
    }

    Err(Error::BinaryNotFound {
        name: name.to_string(),
        searched,
    })
}

/// Find arduino-cli in the standard installation directories or `PATH`.
pub fn locate_arduino_cli() -> Result<PathBuf> {
    let dirs: Vec<PathBuf> = INSTALL_DIRS.iter().map(PathBuf::from).collect();
    locate_binary(BINARY_NAME, &dirs)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Executes arduino-cli commands for one session.
///
/// Cheap to clone; clones share the runner.
#[derive(Clone)]
pub struct Invoker {
    program: PathBuf,
    globals: GlobalOptions,
    runner: Arc<dyn ProcessRunner>,
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("program", &self.program)
            .field("globals", &self.globals)
            .finish_non_exhaustive()
    }
}

impl Invoker {
    /// Create an invoker for `program` that launches real processes.
    pub fn new(program: impl Into<PathBuf>, globals: GlobalOptions) -> Self {
        Self::with_runner(program, globals, Arc::new(SystemRunner))
    }

    /// Create an invoker with a custom process runner.
    pub fn with_runner(
        program: impl Into<PathBuf>,
        globals: GlobalOptions,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            program: program.into(),
            globals,
            runner,
        }
    }

    /// Locate arduino-cli and create an invoker for it.
    pub fn locate(globals: GlobalOptions) -> Result<Self> {
        Ok(Self::new(locate_arduino_cli()?, globals))
    }

    /// Path of the executable being invoked.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Global options appended to every invocation.
    pub fn globals(&self) -> &GlobalOptions {
        &self.globals
    }

    /// Full argument vector for `command`, global options included.
    pub fn argv(&self, command: &CliCommand) -> Vec<OsString> {
        let mut argv = command.args().to_vec();
        argv.extend(self.globals.to_args());
        argv
    }

    /// Run `command` once and return its standard output.
    ///
    /// # Errors
    /// - `Launch` if the process cannot be started
    /// - `CommandFailed` if it exits with anything other than 0
    pub fn invoke(&self, command: CliCommand) -> Result<Vec<u8>> {
        let argv = self.argv(&command);
        tracing::debug!(program = %self.program.display(), args = ?argv, "running arduino-cli");

        let output = self
            .runner
            .run(&self.program, &argv)
            .map_err(|source| Error::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.success() {
            tracing::warn!(command = %command, code = ?output.code, "arduino-cli exited with failure");
            return Err(Error::CommandFailed { code: output.code });
        }

        Ok(output.stdout)
    }

    /// Run an arbitrary subcommand path that has no dedicated builder.
    pub fn run<I, S>(&self, args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.invoke(CliCommand::new(args))
    }
}
