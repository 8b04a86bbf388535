//! Housekeeping commands: `cache clean`, `completion`, `outdated`, `update`,
//! `upgrade` and `version`.

use super::PostInstallOptions;
use crate::Result;
use crate::process::command::CliCommand;
use crate::process::Invoker;
use clap::ValueEnum;
use std::fs;
use std::path::Path;

/// Shells arduino-cli can generate completion scripts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Shell {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
            Shell::Powershell => "powershell",
        }
    }
}

impl std::fmt::Display for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn cache_clean_command() -> CliCommand {
    CliCommand::new(["cache", "clean"])
}

pub fn completion_command(shell: Shell, no_descriptions: bool) -> CliCommand {
    CliCommand::new(["completion"])
        .arg(shell.as_str())
        .flag_if("--no-descriptions", no_descriptions)
}

pub fn outdated_command() -> CliCommand {
    CliCommand::new(["outdated"])
}

pub fn update_command(show_outdated: bool) -> CliCommand {
    CliCommand::new(["update"]).flag_if("--show-outdated", show_outdated)
}

pub fn upgrade_command(options: &PostInstallOptions) -> Result<CliCommand> {
    options.apply(CliCommand::new(["upgrade"]))
}

pub fn version_command() -> CliCommand {
    CliCommand::new(["version"])
}

/// Housekeeping operations bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct Maintenance<'a> {
    invoker: &'a Invoker,
}

impl<'a> Maintenance<'a> {
    pub fn new(invoker: &'a Invoker) -> Self {
        Self { invoker }
    }

    /// Delete arduino-cli's download cache.
    pub fn cache_clean(&self) -> Result<Vec<u8>> {
        self.invoker.invoke(cache_clean_command())
    }

    /// Generate a completion script for `shell`.
    ///
    /// The script is returned, and also written to `output` when given.
    pub fn completion(
        &self,
        shell: Shell,
        no_descriptions: bool,
        output: Option<&Path>,
    ) -> Result<Vec<u8>> {
        let script = self
            .invoker
            .invoke(completion_command(shell, no_descriptions))?;
        if let Some(path) = output {
            fs::write(path, &script)?;
            tracing::debug!(path = %path.display(), %shell, "wrote completion script");
        }
        Ok(script)
    }

    /// List cores and libraries that can be upgraded.
    pub fn outdated(&self) -> Result<Vec<u8>> {
        self.invoker.invoke(outdated_command())
    }

    /// Update the core and library indexes.
    pub fn update(&self, show_outdated: bool) -> Result<Vec<u8>> {
        self.invoker.invoke(update_command(show_outdated))
    }

    /// Upgrade every installed core and library.
    pub fn upgrade(&self, options: &PostInstallOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(upgrade_command(options)?)
    }

    /// Print arduino-cli's version.
    pub fn version(&self) -> Result<Vec<u8>> {
        self.invoker.invoke(version_command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::test_utils::{RecordingRunner, stub_invoker};
    use tempfile::TempDir;

    #[test]
    fn test_simple_commands() {
        assert_eq!(cache_clean_command().args(), &["cache", "clean"]);
        assert_eq!(outdated_command().args(), &["outdated"]);
        assert_eq!(version_command().args(), &["version"]);
        assert_eq!(update_command(false).args(), &["update"]);
        assert_eq!(
            update_command(true).args(),
            &["update", "--show-outdated"]
        );
    }

    #[test]
    fn test_completion_has_no_redirection_tokens() {
        let cmd = completion_command(Shell::Zsh, true);
        assert_eq!(cmd.args(), &["completion", "zsh", "--no-descriptions"]);
        assert!(!cmd.args().iter().any(|a| a == ">"));
    }

    #[test]
    fn test_completion_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arduino-cli.bash");
        let runner = RecordingRunner::succeeding(b"# bash completion\n");
        let invoker = stub_invoker(&runner);

        let script = Maintenance::new(&invoker)
            .completion(Shell::Bash, false, Some(&path))
            .unwrap();

        assert_eq!(script, b"# bash completion\n");
        assert_eq!(fs::read(&path).unwrap(), b"# bash completion\n");
        assert_eq!(runner.single_call(), vec!["completion", "bash"]);
    }

    #[test]
    fn test_completion_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arduino-cli.fish");
        let runner = RecordingRunner::failing(2, b"");
        let invoker = stub_invoker(&runner);

        let err = Maintenance::new(&invoker)
            .completion(Shell::Fish, false, Some(&path))
            .unwrap_err();

        assert!(matches!(err, Error::CommandFailed { code: Some(2) }));
        assert!(!path.exists());
    }

    #[test]
    fn test_upgrade_flags() {
        let options = PostInstallOptions {
            run_post_install: false,
            skip_post_install: true,
        };
        assert_eq!(
            upgrade_command(&options).unwrap().args(),
            &["upgrade", "--skip-post-install"]
        );
    }

    #[test]
    fn test_upgrade_conflict_does_not_invoke() {
        let runner = RecordingRunner::succeeding(b"");
        let invoker = stub_invoker(&runner);
        let options = PostInstallOptions {
            run_post_install: true,
            skip_post_install: true,
        };

        let err = Maintenance::new(&invoker).upgrade(&options).unwrap_err();

        assert!(matches!(err, Error::ConflictingArgs { .. }));
        assert_eq!(runner.call_count(), 0);
    }
}
