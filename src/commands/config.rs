//! `arduino-cli config` commands.
//!
//! All writes to the configuration file go through these commands; the
//! [`ConfigFile`] model is read-only from this crate's point of view.

use crate::config::ConfigFile;
use crate::process::command::{CliCommand, exclusive};
use crate::process::Invoker;
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Options for `config init`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Directory to write `arduino-cli.yaml` into (`--dest-dir`)
    pub dest_dir: Option<PathBuf>,
    /// Exact file to write (`--dest-file`)
    pub dest_file: Option<PathBuf>,
    /// Replace an existing file (`--overwrite`)
    pub overwrite: bool,
}

fn require_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::InvalidInput("config key must not be empty".to_string()));
    }
    Ok(())
}

fn require_values(key: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(Error::InvalidInput(format!(
            "at least one value is required for '{}'",
            key
        )));
    }
    Ok(())
}

pub fn add_command(key: &str, values: &[String]) -> Result<CliCommand> {
    require_key(key)?;
    require_values(key, values)?;
    Ok(CliCommand::new(["config", "add"])
        .arg(key)
        .args_from(values.iter().cloned()))
}

pub fn delete_command(key: &str) -> Result<CliCommand> {
    require_key(key)?;
    Ok(CliCommand::new(["config", "delete"]).arg(key))
}

pub fn dump_command() -> CliCommand {
    CliCommand::new(["config", "dump"])
}

pub fn init_command(options: &InitOptions) -> Result<CliCommand> {
    exclusive(
        ("--dest-dir", options.dest_dir.is_some()),
        ("--dest-file", options.dest_file.is_some()),
    )?;

    Ok(CliCommand::new(["config", "init"])
        .opt_path("--dest-dir", options.dest_dir.as_deref())
        .opt_path("--dest-file", options.dest_file.as_deref())
        .flag_if("--overwrite", options.overwrite))
}

pub fn remove_command(key: &str, values: &[String]) -> Result<CliCommand> {
    require_key(key)?;
    require_values(key, values)?;
    Ok(CliCommand::new(["config", "remove"])
        .arg(key)
        .args_from(values.iter().cloned()))
}

pub fn set_command(key: &str, values: &[String]) -> Result<CliCommand> {
    require_key(key)?;
    require_values(key, values)?;
    Ok(CliCommand::new(["config", "set"])
        .arg(key)
        .args_from(values.iter().cloned()))
}

/// Config commands bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct Config<'a> {
    invoker: &'a Invoker,
}

impl<'a> Config<'a> {
    pub fn new(invoker: &'a Invoker) -> Self {
        Self { invoker }
    }

    /// Add one or more values to a list setting, e.g. `board_manager.additional_urls`.
    pub fn add(&self, key: &str, values: &[String]) -> Result<Vec<u8>> {
        self.invoker.invoke(add_command(key, values)?)
    }

    /// Delete a setting and all its sub keys.
    pub fn delete(&self, key: &str) -> Result<Vec<u8>> {
        self.invoker.invoke(delete_command(key)?)
    }

    /// Print the current configuration.
    pub fn dump(&self) -> Result<Vec<u8>> {
        self.invoker.invoke(dump_command())
    }

    /// Write the current configuration to a file.
    pub fn init(&self, options: &InitOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(init_command(options)?)
    }

    /// Remove one or more values from a list setting.
    pub fn remove(&self, key: &str, values: &[String]) -> Result<Vec<u8>> {
        self.invoker.invoke(remove_command(key, values)?)
    }

    /// Set a setting; list settings take several values.
    pub fn set(&self, key: &str, values: &[String]) -> Result<Vec<u8>> {
        self.invoker.invoke(set_command(key, values)?)
    }

    /// Read and decode a configuration file.
    pub fn read(&self, path: &Path) -> Result<ConfigFile> {
        ConfigFile::load(path)
    }

    /// Make sure a configuration file exists at `path`.
    ///
    /// When absent, an empty file is created as a target and arduino-cli's own
    /// `config init` fills it in. If `config init` fails the empty file is
    /// removed again, so a later call retries. Returns `true` if the file was
    /// created.
    pub fn ensure_file(&self, path: &Path) -> Result<bool> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        match fs::OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        }

        let init = self.init(&InitOptions {
            dest_file: Some(path.to_path_buf()),
            overwrite: true,
            ..Default::default()
        });
        if let Err(e) = init {
            if let Err(cleanup) = fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %cleanup, "could not remove empty configuration file");
            }
            return Err(e);
        }

        tracing::info!(path = %path.display(), "initialized arduino-cli configuration");
        Ok(true)
    }
}
