//! Typed model of `arduino-cli.yaml`.
//!
//! Field names match the on-disk snake_case keys one-to-one. Every section and
//! key is required: a file missing one is a decode error, not a default.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

/// Complete arduino-cli configuration file.
///
/// # YAML Schema
///
/// ```yaml
/// board_manager:
///   additional_urls: []
/// daemon:
///   port: "50051"
/// directories:
///   data: /home/user/.arduino15
///   downloads: /home/user/.arduino15/staging
///   user: /home/user/Arduino
/// library:
///   enable_unsafe_install: false
/// logging:
///   file: ""
///   format: text
///   level: info
/// metrics:
///   addr: ":9090"
///   enabled: true
/// output:
///   no_color: false
/// sketch:
///   always_export_binaries: false
/// updater:
///   enable_notification: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub board_manager: BoardManager,
    pub daemon: Daemon,
    pub directories: Directories,
    pub library: Library,
    pub logging: Logging,
    pub metrics: Metrics,
    pub output: Output,
    pub sketch: Sketch,
    pub updater: Updater,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardManager {
    /// Extra package index URLs for third-party cores
    pub additional_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Daemon {
    /// gRPC port, stored as a string by arduino-cli
    pub port: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directories {
    /// Cores, tools and package indexes
    pub data: String,
    /// Staging area for downloaded archives
    pub downloads: String,
    /// Sketchbook, including user-installed libraries
    pub user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    /// Allow `lib install --git-url` and `--zip-path`
    pub enable_unsafe_install: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logging {
    pub file: String,
    pub format: String,
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub addr: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub no_color: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sketch {
    pub always_export_binaries: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Updater {
    pub enable_notification: bool,
}

impl ConfigFile {
    /// Decode a configuration document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read and decode a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Encode as YAML.
    ///
    /// arduino-cli is the only writer of its configuration file; use the
    /// `config set|add|remove|delete` commands to change values on disk.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse the board-manager URLs.
    ///
    /// # Errors
    /// - `InvalidUrl` for the first URL that does not parse
    pub fn additional_urls(&self) -> Result<Vec<Url>> {
        self.board_manager
            .additional_urls
            .iter()
            .map(|raw| {
                Url::parse(raw).map_err(|source| Error::InvalidUrl {
                    url: raw.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Parse the daemon port.
    pub fn daemon_port(&self) -> Result<u16> {
        self.daemon.port.trim().parse().map_err(|_| {
            Error::InvalidInput(format!("daemon.port is not a valid port: '{}'", self.daemon.port))
        })
    }
}
