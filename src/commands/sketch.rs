//! `arduino-cli sketch` commands.

use crate::process::command::{CliCommand, requires};
use crate::process::Invoker;
use crate::{Error, Result};
use std::path::PathBuf;

/// Options for `sketch archive`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Sketch to archive; arduino-cli uses the current directory when omitted
    pub sketch_path: Option<PathBuf>,
    /// Where to write the zip; needs `sketch_path`
    pub archive_path: Option<PathBuf>,
    /// Include the build directory in the archive (`--include-build-dir`)
    pub include_build_dir: bool,
}

pub fn archive_command(options: &ArchiveOptions) -> Result<CliCommand> {
    requires(
        ("archive path", options.archive_path.is_some()),
        ("sketch path", options.sketch_path.is_some()),
    )?;

    Ok(CliCommand::new(["sketch", "archive"])
        .opt_path_arg(options.sketch_path.as_deref())
        .opt_path_arg(options.archive_path.as_deref())
        .flag_if("--include-build-dir", options.include_build_dir))
}

pub fn new_command(name: &str) -> Result<CliCommand> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput(
            "sketch name must not be empty".to_string(),
        ));
    }
    Ok(CliCommand::new(["sketch", "new"]).arg(name))
}

/// Sketch commands bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct Sketch<'a> {
    invoker: &'a Invoker,
}

impl<'a> Sketch<'a> {
    pub fn new(invoker: &'a Invoker) -> Self {
        Self { invoker }
    }

    /// Create a zip file containing all sketch files.
    pub fn archive(&self, options: &ArchiveOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(archive_command(options)?)
    }

    /// Create a new sketch.
    pub fn create(&self, name: &str) -> Result<Vec<u8>> {
        self.invoker.invoke(new_command(name)?)
    }
}
