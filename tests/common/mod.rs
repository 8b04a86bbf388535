//! Common test utilities for ardcli integration tests.
//!
//! Provides `TestEnv`, which installs a fake `arduino-cli` shell script in a
//! temporary directory so tests never touch a real toolchain.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// Records each argument on its own line, prints `FAKE_ARDUINO_STDOUT` and
/// exits with `FAKE_ARDUINO_EXIT`.
const FAKE_ARDUINO_CLI: &str = r#"#!/bin/sh
: > "$FAKE_ARDUINO_LOG"
for arg in "$@"; do
    printf '%s\n' "$arg" >> "$FAKE_ARDUINO_LOG"
done
printf '%s' "${FAKE_ARDUINO_STDOUT:-}"
exit "${FAKE_ARDUINO_EXIT:-0}"
"#;

/// A test environment with a fake arduino-cli.
///
/// - `work_dir`: current directory for the command under test
/// - `bin_dir`: holds the fake `arduino-cli` and the argument log
///
/// The `ardcli()` method returns a `Command` pointed at the fake binary with
/// the install check disabled, making tests parallel-safe.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub bin_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let env = Self {
            work_dir: TempDir::new().unwrap(),
            bin_dir: TempDir::new().unwrap(),
        };
        let script = env.fake_cli_path();
        fs::write(&script, FAKE_ARDUINO_CLI).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        env
    }

    /// Get a Command for the ardcli binary wired to the fake arduino-cli.
    pub fn ardcli(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ardcli"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("ARDCLI_CLI_PATH", self.fake_cli_path());
        cmd.env("ARDCLI_NO_INSTALL_CHECK", "true");
        cmd.env("FAKE_ARDUINO_LOG", self.log_path());
        cmd.env_remove("ARDCLI_LOG");
        cmd
    }

    pub fn fake_cli_path(&self) -> PathBuf {
        self.bin_dir.path().join("arduino-cli")
    }

    pub fn log_path(&self) -> PathBuf {
        self.bin_dir.path().join("args.log")
    }

    /// Arguments the fake arduino-cli received, or `None` if it never ran.
    pub fn recorded_args(&self) -> Option<Vec<String>> {
        let text = fs::read_to_string(self.log_path()).ok()?;
        Some(text.lines().map(str::to_string).collect())
    }

    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
