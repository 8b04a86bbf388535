//! Typed `arduino-cli` operations.
//!
//! Each submodule pairs pure `*_command` builders, which only produce a
//! [`CliCommand`], with a façade that borrows the session's [`Invoker`]:
//! - `board` - board discovery and details
//! - `config` - configuration file commands
//! - `core` - platform management
//! - `library` - library management
//! - `sketch` - sketch creation and archiving
//! - `build` - compile, upload, debug, monitor and burn-bootloader
//! - `maintenance` - cache, completion, outdated, update, upgrade and version
//!
//! Validation happens in the builders, so an invalid option combination never
//! launches a process.
//!
//! [`Invoker`]: crate::process::Invoker

use crate::Result;
use crate::process::command::{CliCommand, exclusive};

pub mod board;
pub mod build;
pub mod config;
pub mod core;
pub mod library;
pub mod maintenance;
pub mod sketch;

/// Post-install script handling shared by `core install`, `core upgrade` and `upgrade`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostInstallOptions {
    /// Force post-install scripts to run (`--run-post-install`)
    pub run_post_install: bool,
    /// Skip post-install scripts (`--skip-post-install`)
    pub skip_post_install: bool,
}

impl PostInstallOptions {
    /// Append the post-install flags to `cmd`.
    pub(crate) fn apply(&self, cmd: CliCommand) -> Result<CliCommand> {
        exclusive(
            ("--run-post-install", self.run_post_install),
            ("--skip-post-install", self.skip_post_install),
        )?;
        Ok(cmd
            .flag_if("--run-post-install", self.run_post_install)
            .flag_if("--skip-post-install", self.skip_post_install))
    }
}

/// Upload target shared by `upload`, `burn-bootloader`, `debug` and `compile --upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetOptions {
    /// Fully Qualified Board Name (`-b`)
    pub fqbn: Option<String>,
    /// Port address (`-p`)
    pub port: Option<String>,
    /// Programmer to use instead of the serial bootloader (`-P`)
    pub programmer: Option<String>,
    /// Port protocol (`-l`)
    pub protocol: Option<String>,
    /// Max time to wait for port discovery (`--discovery-timeout`)
    pub discovery_timeout: Option<String>,
}

impl TargetOptions {
    pub(crate) fn apply(&self, cmd: CliCommand) -> CliCommand {
        cmd.opt_value("-b", self.fqbn.as_deref())
            .opt_value("-p", self.port.as_deref())
            .opt_value("-P", self.programmer.as_deref())
            .opt_value("-l", self.protocol.as_deref())
            .opt_value("--discovery-timeout", self.discovery_timeout.as_deref())
    }
}
