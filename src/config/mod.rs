//! arduino-cli configuration file access.
//!
//! ## arduino-cli.yaml
//!
//! Default location (owned by arduino-cli, not by this crate):
//! - Linux: `~/.arduino15/arduino-cli.yaml`
//! - macOS: `~/Library/Arduino15/arduino-cli.yaml`
//! - Windows: `%LOCALAPPDATA%\Arduino15\arduino-cli.yaml`
//!
//! This module only reads the file. New files are created by running
//! `arduino-cli config init` (see [`crate::commands::config::Config::ensure_file`]),
//! and values are changed through `config set|add|remove|delete`, so arduino-cli
//! stays the single writer of its own format.

pub mod schema;

pub use schema::{
    BoardManager, ConfigFile, Daemon, Directories, Library, Logging, Metrics, Output, Sketch,
    Updater,
};

use std::path::PathBuf;

/// File name arduino-cli uses for its configuration.
pub const CONFIG_FILE_NAME: &str = "arduino-cli.yaml";

/// Directory arduino-cli keeps its data and configuration in.
pub fn default_data_dir() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Arduino15"))
    } else if cfg!(windows) {
        dirs::data_local_dir().map(|d| d.join("Arduino15"))
    } else {
        dirs::home_dir().map(|h| h.join(".arduino15"))
    }
}

/// Path arduino-cli reads its configuration from when `--config-file` is not given.
pub fn default_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join(CONFIG_FILE_NAME))
}
