//! ardcli - typed bindings for the `arduino-cli` toolchain manager.
//!
//! This library turns typed options into `arduino-cli` argument vectors, runs
//! the binary, and hands back its raw output. It also reads arduino-cli's YAML
//! configuration file and manages the background gRPC daemon.
//!
//! Start from [`ArduinoCli`], which owns the session's global options and
//! exposes the `board`, `config`, `core`, `lib` and `sketch` façades.

pub mod cli;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod index;
pub mod install;
pub mod process;
pub mod session;

pub use session::{ArduinoCli, ArduinoCliBuilder};

use std::path::PathBuf;

/// Test utilities shared by unit tests.
#[cfg(test)]
pub(crate) mod test_utils {
    use crate::process::{GlobalOptions, Invoker, ProcessOutput, ProcessRunner};
    use std::ffi::OsString;
    use std::io;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    /// Process runner that records every argument vector and replays a fixed result.
    pub struct RecordingRunner {
        calls: Mutex<Vec<Vec<OsString>>>,
        code: Option<i32>,
        stdout: Vec<u8>,
    }

    impl RecordingRunner {
        pub fn with_output(code: Option<i32>, stdout: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                code,
                stdout: stdout.to_vec(),
            })
        }

        pub fn succeeding(stdout: &[u8]) -> Arc<Self> {
            Self::with_output(Some(0), stdout)
        }

        pub fn failing(code: i32, stdout: &[u8]) -> Arc<Self> {
            Self::with_output(Some(code), stdout)
        }

        /// Recorded argument vectors, lossily converted for easy comparison.
        pub fn calls(&self) -> Vec<Vec<String>> {
            self.raw_calls()
                .iter()
                .map(|argv| argv.iter().map(|a| a.to_string_lossy().into_owned()).collect())
                .collect()
        }

        pub fn raw_calls(&self) -> Vec<Vec<OsString>> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// The only recorded argument vector; panics unless exactly one call was made.
        pub fn single_call(&self) -> Vec<String> {
            let calls = self.calls();
            assert_eq!(calls.len(), 1, "expected exactly one invocation: {:?}", calls);
            calls.into_iter().next().unwrap()
        }
    }

    impl ProcessRunner for RecordingRunner {
        fn run(&self, _program: &Path, args: &[OsString]) -> io::Result<ProcessOutput> {
            self.calls.lock().unwrap().push(args.to_vec());
            Ok(ProcessOutput {
                code: self.code,
                stdout: self.stdout.clone(),
            })
        }
    }

    /// Invoker with no global options backed by a recording runner.
    pub fn stub_invoker(runner: &Arc<RecordingRunner>) -> Invoker {
        Invoker::with_runner("arduino-cli", GlobalOptions::new(), runner.clone())
    }
}

/// Library-level error type for ardcli operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Conflicting arguments: {first} and {second} cannot be used together")]
    ConflictingArgs { first: String, second: String },

    #[error("Missing arguments: one of {first} or {second} is required")]
    MissingArgs { first: String, second: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{name} not found (searched {} directories). Install it with: brew install {name}", .searched.len())]
    BinaryNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Package manager unavailable: {0}")]
    PackageManager(String),

    #[error("arduino-cli command failed{}", .code.map(|c| format!(" with exit code {}", c)).unwrap_or_default())]
    CommandFailed { code: Option<i32> },

    #[error("Invalid configuration file: {0}")]
    Decode(#[from] serde_yaml::Error),

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
}

/// Result type alias for ardcli operations.
pub type Result<T> = std::result::Result<T, Error>;
