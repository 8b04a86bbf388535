//! `arduino-cli lib` commands.

use crate::process::command::{CliCommand, exclusive};
use crate::process::Invoker;
use crate::{Error, Result};

/// Options for `lib examples`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExamplesOptions {
    /// Only show examples compatible with this board (`-b`)
    pub fqbn: Option<String>,
}

/// Options for `lib install`.
///
/// With `git_url` or `zip_path` set, the names passed to install are git URLs
/// or archive paths instead of library names. arduino-cli only honours these
/// when `library.enable_unsafe_install` is set in its configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Install from git repositories (`--git-url`)
    pub git_url: bool,
    /// Install from zip archives (`--zip-path`)
    pub zip_path: bool,
    /// Do not install dependencies (`--no-deps`)
    pub no_deps: bool,
}

/// Options for `lib list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Include built-in libraries from platforms and the IDE (`--all`)
    pub all: bool,
    /// Only list libraries compatible with this board (`-b`)
    pub fqbn: Option<String>,
    /// Only list libraries with an update available (`--updatable`)
    pub updatable: bool,
}

/// Options for `lib search`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Show library names only (`--names`)
    pub names: bool,
}

fn require_libraries(libraries: &[String]) -> Result<()> {
    if libraries.is_empty() {
        return Err(Error::InvalidInput(
            "at least one library is required".to_string(),
        ));
    }
    Ok(())
}

pub fn deps_command(library: &str) -> CliCommand {
    CliCommand::new(["lib", "deps"]).arg(library)
}

pub fn download_command(libraries: &[String]) -> Result<CliCommand> {
    require_libraries(libraries)?;
    Ok(CliCommand::new(["lib", "download"]).args_from(libraries.iter().cloned()))
}

pub fn examples_command(library: Option<&str>, options: &ExamplesOptions) -> CliCommand {
    CliCommand::new(["lib", "examples"])
        .opt_arg(library)
        .opt_value("-b", options.fqbn.as_deref())
}

pub fn install_command(libraries: &[String], options: &InstallOptions) -> Result<CliCommand> {
    require_libraries(libraries)?;
    exclusive(
        ("--git-url", options.git_url),
        ("--zip-path", options.zip_path),
    )?;

    Ok(CliCommand::new(["lib", "install"])
        .args_from(libraries.iter().cloned())
        .flag_if("--git-url", options.git_url)
        .flag_if("--zip-path", options.zip_path)
        .flag_if("--no-deps", options.no_deps))
}

pub fn list_command(library: Option<&str>, options: &ListOptions) -> CliCommand {
    CliCommand::new(["lib", "list"])
        .opt_arg(library)
        .flag_if("--all", options.all)
        .opt_value("-b", options.fqbn.as_deref())
        .flag_if("--updatable", options.updatable)
}

pub fn search_command(keywords: &[String], options: &SearchOptions) -> CliCommand {
    CliCommand::new(["lib", "search"])
        .args_from(keywords.iter().cloned())
        .flag_if("--names", options.names)
}

pub fn uninstall_command(libraries: &[String]) -> Result<CliCommand> {
    require_libraries(libraries)?;
    Ok(CliCommand::new(["lib", "uninstall"]).args_from(libraries.iter().cloned()))
}

pub fn update_index_command() -> CliCommand {
    CliCommand::new(["lib", "update-index"])
}

pub fn upgrade_command(libraries: &[String]) -> CliCommand {
    CliCommand::new(["lib", "upgrade"]).args_from(libraries.iter().cloned())
}

/// Library commands bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct Lib<'a> {
    invoker: &'a Invoker,
}

impl<'a> Lib<'a> {
    pub fn new(invoker: &'a Invoker) -> Self {
        Self { invoker }
    }

    /// Check dependency status for a library.
    pub fn deps(&self, library: &str) -> Result<Vec<u8>> {
        self.invoker.invoke(deps_command(library))
    }

    /// Download libraries without installing them.
    pub fn download(&self, libraries: &[String]) -> Result<Vec<u8>> {
        self.invoker.invoke(download_command(libraries)?)
    }

    /// Show the examples shipped with libraries.
    pub fn examples(&self, library: Option<&str>, options: &ExamplesOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(examples_command(library, options))
    }

    /// Install a single library, e.g. `"wordwrap"` or `"Servo@1.1.8"`.
    pub fn install(&self, library: &str, options: &InstallOptions) -> Result<Vec<u8>> {
        self.install_many(&[library.to_string()], options)
    }

    /// Install several libraries in one invocation.
    pub fn install_many(&self, libraries: &[String], options: &InstallOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(install_command(libraries, options)?)
    }

    /// Show installed libraries.
    pub fn list(&self, library: Option<&str>, options: &ListOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(list_command(library, options))
    }

    /// Search the library index.
    pub fn search(&self, keywords: &[String], options: &SearchOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(search_command(keywords, options))
    }

    /// Uninstall libraries.
    pub fn uninstall(&self, libraries: &[String]) -> Result<Vec<u8>> {
        self.invoker.invoke(uninstall_command(libraries)?)
    }

    /// Update the library index.
    pub fn update_index(&self) -> Result<Vec<u8>> {
        self.invoker.invoke(update_index_command())
    }

    /// Upgrade the given libraries, or every installed library when empty.
    pub fn upgrade(&self, libraries: &[String]) -> Result<Vec<u8>> {
        self.invoker.invoke(upgrade_command(libraries))
    }
}
