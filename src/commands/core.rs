//! `arduino-cli core` commands.

use super::PostInstallOptions;
use crate::{Error, Result};
use crate::process::command::CliCommand;
use crate::process::Invoker;

/// Options for `core list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Include all installable and installed cores, including manually installed ones (`--all`)
    pub all: bool,
    /// Only list platforms with an update available (`--updatable`)
    pub updatable: bool,
}

/// Options for `core search`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Show every available core version (`--all`)
    pub all: bool,
}

fn require_cores(cores: &[String]) -> Result<()> {
    if cores.is_empty() {
        return Err(Error::InvalidInput("at least one core is required".to_string()));
    }
    Ok(())
}

pub fn download_command(cores: &[String]) -> Result<CliCommand> {
    require_cores(cores)?;
    Ok(CliCommand::new(["core", "download"]).args_from(cores.iter().cloned()))
}

pub fn install_command(core: &str, options: &PostInstallOptions) -> Result<CliCommand> {
    options.apply(CliCommand::new(["core", "install"]).arg(core))
}

pub fn list_command(options: &ListOptions) -> CliCommand {
    CliCommand::new(["core", "list"])
        .flag_if("--all", options.all)
        .flag_if("--updatable", options.updatable)
}

pub fn search_command(keywords: &[String], options: &SearchOptions) -> CliCommand {
    CliCommand::new(["core", "search"])
        .args_from(keywords.iter().cloned())
        .flag_if("--all", options.all)
}

pub fn uninstall_command(cores: &[String]) -> Result<CliCommand> {
    require_cores(cores)?;
    Ok(CliCommand::new(["core", "uninstall"]).args_from(cores.iter().cloned()))
}

pub fn update_index_command() -> CliCommand {
    CliCommand::new(["core", "update-index"])
}

pub fn upgrade_command(core: Option<&str>, options: &PostInstallOptions) -> Result<CliCommand> {
    options.apply(CliCommand::new(["core", "upgrade"]).opt_arg(core))
}

/// Core (platform) commands bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct Core<'a> {
    invoker: &'a Invoker,
}

impl<'a> Core<'a> {
    pub fn new(invoker: &'a Invoker) -> Self {
        Self { invoker }
    }

    /// Download cores and their tool dependencies without installing them.
    pub fn download(&self, cores: &[String]) -> Result<Vec<u8>> {
        self.invoker.invoke(download_command(cores)?)
    }

    /// Install a core, e.g. `arduino:samd@1.8.13`.
    pub fn install(&self, core: &str, options: &PostInstallOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(install_command(core, options)?)
    }

    /// Show installed platforms.
    pub fn list(&self, options: &ListOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(list_command(options))
    }

    /// Search for a core in the Boards Manager.
    pub fn search(&self, keywords: &[String], options: &SearchOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(search_command(keywords, options))
    }

    /// Uninstall cores and tools no longer used by other cores.
    pub fn uninstall(&self, cores: &[String]) -> Result<Vec<u8>> {
        self.invoker.invoke(uninstall_command(cores)?)
    }

    /// Update the index of cores.
    pub fn update_index(&self) -> Result<Vec<u8>> {
        self.invoker.invoke(update_index_command())
    }

    /// Upgrade one installed platform, or all of them when `core` is `None`.
    pub fn upgrade(&self, core: Option<&str>, options: &PostInstallOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(upgrade_command(core, options)?)
    }
}
