//! arduino-cli argument generation.
//!
//! This module provides a builder for argument vectors passed to `arduino-cli`.
//! It does not execute anything; see [`crate::process::Invoker`] for that.

use crate::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// Builder for an `arduino-cli` argument vector.
///
/// Every flag and every value is kept as its own token so values containing
/// spaces survive intact when handed to the process. Tokens are OS strings;
/// paths are passed through byte for byte even when they are not UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliCommand {
    args: Vec<OsString>,
}

impl CliCommand {
    /// Start a command from its subcommand path.
    ///
    /// # Example
    /// ```
    /// use ardcli::process::command::CliCommand;
    /// let cmd = CliCommand::new(["core", "install"]).arg("arduino:avr").flag("--run-post-install");
    /// assert_eq!(cmd.args(), &["core", "install", "arduino:avr", "--run-post-install"]);
    /// ```
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            args: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a boolean flag.
    pub fn flag(mut self, flag: &str) -> Self {
        self.args.push(flag.into());
        self
    }

    /// Add a boolean flag only when `enabled` is set.
    pub fn flag_if(self, flag: &str, enabled: bool) -> Self {
        if enabled { self.flag(flag) } else { self }
    }

    /// Add a flag followed by its value.
    pub fn value(mut self, flag: &str, value: impl Into<OsString>) -> Self {
        self.args.push(flag.into());
        self.args.push(value.into());
        self
    }

    /// Add a flag and value when the value is present.
    pub fn opt_value(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.value(flag, v),
            None => self,
        }
    }

    /// Add a flag and a path value when the path is present.
    pub fn opt_path(self, flag: &str, path: Option<&Path>) -> Self {
        match path {
            Some(p) => self.value(flag, p),
            None => self,
        }
    }

    /// Add one flag/value pair per element, for flags that may be given repeatedly.
    ///
    /// # Example
    /// ```
    /// use ardcli::process::command::CliCommand;
    /// let props = vec!["a=1".to_string(), "b=2".to_string()];
    /// let cmd = CliCommand::new(["compile"]).repeated("--build-property", &props);
    /// assert_eq!(
    ///     cmd.args(),
    ///     &["compile", "--build-property", "a=1", "--build-property", "b=2"]
    /// );
    /// ```
    pub fn repeated(mut self, flag: &str, values: &[String]) -> Self {
        for value in values {
            self.args.push(flag.into());
            self.args.push(OsStr::new(value).to_owned());
        }
        self
    }

    /// Like [`CliCommand::repeated`], for path values.
    pub fn repeated_paths(mut self, flag: &str, paths: &[PathBuf]) -> Self {
        for path in paths {
            self.args.push(flag.into());
            self.args.push(path.as_os_str().to_owned());
        }
        self
    }

    /// Add a positional argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a positional argument when present.
    pub fn opt_arg(self, arg: Option<&str>) -> Self {
        match arg {
            Some(a) => self.arg(a),
            None => self,
        }
    }

    /// Add a positional path argument when present.
    pub fn opt_path_arg(self, path: Option<&Path>) -> Self {
        match path {
            Some(p) => self.arg(p),
            None => self,
        }
    }

    /// Add several positional arguments.
    pub fn args_from<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Get the tokens built so far.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Consume the builder, returning its tokens.
    pub fn into_args(self) -> Vec<OsString> {
        self.args
    }
}

/// Space-joined rendering, for log lines only.
impl fmt::Display for CliCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<_> = self.args.iter().map(|a| a.to_string_lossy()).collect();
        write!(f, "{}", tokens.join(" "))
    }
}

/// Fail when two mutually exclusive options are both set.
///
/// Each option is given as `(flag spelling, is set)`.
pub fn exclusive(first: (&str, bool), second: (&str, bool)) -> Result<()> {
    if first.1 && second.1 {
        return Err(Error::ConflictingArgs {
            first: first.0.to_string(),
            second: second.0.to_string(),
        });
    }
    Ok(())
}

/// Fail unless exactly one of two options is set.
pub fn exactly_one(first: (&str, bool), second: (&str, bool)) -> Result<()> {
    exclusive(first, second)?;
    if !first.1 && !second.1 {
        return Err(Error::MissingArgs {
            first: first.0.to_string(),
            second: second.0.to_string(),
        });
    }
    Ok(())
}

/// Fail when `dependent` is set without `prerequisite`.
pub fn requires(dependent: (&str, bool), prerequisite: (&str, bool)) -> Result<()> {
    if dependent.1 && !prerequisite.1 {
        return Err(Error::InvalidInput(format!(
            "{} can only be used together with {}",
            dependent.0, prerequisite.0
        )));
    }
    Ok(())
}
