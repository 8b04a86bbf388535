//! `arduino-cli board` commands.

use crate::Result;
use crate::process::command::{CliCommand, exactly_one};
use crate::process::Invoker;
use std::path::PathBuf;

/// Options for `board attach`.
///
/// Exactly one of `fqbn` or `port` must be given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachOptions {
    /// Fully Qualified Board Name, e.g. `arduino:avr:uno` (`-b`)
    pub fqbn: Option<String>,
    /// Upload port address, e.g. `COM3` or `/dev/ttyACM2` (`-p`)
    pub port: Option<String>,
    /// Upload port protocol, e.g. `serial` (`-l`)
    pub protocol: Option<String>,
    /// Max time to wait for port discovery, e.g. `30s` (`--discovery-timeout`)
    pub discovery_timeout: Option<String>,
    /// Sketch to attach; arduino-cli uses the current directory when omitted
    pub sketch: Option<PathBuf>,
}

/// Options for `board details`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailsOptions {
    /// Show full board details (`-f`)
    pub full: bool,
    /// Show the list of available programmers (`--list-programmers`)
    pub list_programmers: bool,
}

/// Options for `board list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Keep running and print the board list on every change (`-w`)
    pub watch: bool,
    pub discovery_timeout: Option<String>,
}

/// Options for `board listall` and `board search`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAllOptions {
    /// Also show boards marked as hidden in their platform (`-a`)
    pub show_hidden: bool,
}

pub fn attach_command(options: &AttachOptions) -> Result<CliCommand> {
    exactly_one(
        ("-b", options.fqbn.is_some()),
        ("-p", options.port.is_some()),
    )?;

    Ok(CliCommand::new(["board", "attach"])
        .opt_value("-b", options.fqbn.as_deref())
        .opt_value("-p", options.port.as_deref())
        .opt_value("-l", options.protocol.as_deref())
        .opt_value("--discovery-timeout", options.discovery_timeout.as_deref())
        .opt_path_arg(options.sketch.as_deref()))
}

pub fn details_command(fqbn: &str, options: &DetailsOptions) -> CliCommand {
    CliCommand::new(["board", "details"])
        .value("-b", fqbn)
        .flag_if("-f", options.full)
        .flag_if("--list-programmers", options.list_programmers)
}

pub fn list_command(options: &ListOptions) -> CliCommand {
    CliCommand::new(["board", "list"])
        .flag_if("-w", options.watch)
        .opt_value("--discovery-timeout", options.discovery_timeout.as_deref())
}

pub fn listall_command(keywords: &[String], options: &ListAllOptions) -> CliCommand {
    CliCommand::new(["board", "listall"])
        .args_from(keywords.iter().cloned())
        .flag_if("-a", options.show_hidden)
}

pub fn search_command(keywords: &[String], options: &ListAllOptions) -> CliCommand {
    CliCommand::new(["board", "search"])
        .args_from(keywords.iter().cloned())
        .flag_if("-a", options.show_hidden)
}

/// Board commands bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct Board<'a> {
    invoker: &'a Invoker,
}

impl<'a> Board<'a> {
    pub fn new(invoker: &'a Invoker) -> Self {
        Self { invoker }
    }

    /// Attach a sketch to a board.
    pub fn attach(&self, options: &AttachOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(attach_command(options)?)
    }

    /// Print details about a board.
    pub fn details(&self, fqbn: &str, options: &DetailsOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(details_command(fqbn, options))
    }

    /// List connected boards.
    pub fn list(&self, options: &ListOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(list_command(options))
    }

    /// List all known boards and their FQBN, optionally filtered by keywords.
    pub fn list_all(&self, keywords: &[String], options: &ListAllOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(listall_command(keywords, options))
    }

    /// Search for boards in the Boards Manager.
    pub fn search(&self, keywords: &[String], options: &ListAllOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(search_command(keywords, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::test_utils::{RecordingRunner, stub_invoker};

    #[test]
    fn test_attach_by_fqbn() {
        let options = AttachOptions {
            fqbn: Some("arduino:avr:uno".to_string()),
            sketch: Some(PathBuf::from("/sketches/Blink")),
            ..Default::default()
        };
        assert_eq!(
            attach_command(&options).unwrap().args(),
            &["board", "attach", "-b", "arduino:avr:uno", "/sketches/Blink"]
        );
    }

    #[test]
    fn test_attach_by_port_with_protocol() {
        let options = AttachOptions {
            port: Some("/dev/ttyACM0".to_string()),
            protocol: Some("serial".to_string()),
            discovery_timeout: Some("10s".to_string()),
            ..Default::default()
        };
        assert_eq!(
            attach_command(&options).unwrap().args(),
            &[
                "board",
                "attach",
                "-p",
                "/dev/ttyACM0",
                "-l",
                "serial",
                "--discovery-timeout",
                "10s"
            ]
        );
    }

    #[test]
    fn test_attach_requires_board_or_port_without_invoking() {
        let runner = RecordingRunner::succeeding(b"");
        let invoker = stub_invoker(&runner);

        let err = Board::new(&invoker)
            .attach(&AttachOptions::default())
            .unwrap_err();

        assert!(matches!(err, Error::MissingArgs { .. }));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_attach_rejects_board_and_port_without_invoking() {
        let runner = RecordingRunner::succeeding(b"");
        let invoker = stub_invoker(&runner);
        let options = AttachOptions {
            fqbn: Some("arduino:avr:uno".to_string()),
            port: Some("COM3".to_string()),
            ..Default::default()
        };

        let err = Board::new(&invoker).attach(&options).unwrap_err();

        assert!(matches!(err, Error::ConflictingArgs { .. }));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_details() {
        let options = DetailsOptions {
            full: true,
            list_programmers: true,
        };
        assert_eq!(
            details_command("arduino:samd:mkr1000", &options).args(),
            &[
                "board",
                "details",
                "-b",
                "arduino:samd:mkr1000",
                "-f",
                "--list-programmers"
            ]
        );
    }

    #[test]
    fn test_list_watch() {
        let options = ListOptions {
            watch: true,
            ..Default::default()
        };
        assert_eq!(list_command(&options).args(), &["board", "list", "-w"]);
    }

    #[test]
    fn test_listall_keywords_and_hidden() {
        let keywords = vec!["mkr".to_string(), "wifi".to_string()];
        let options = ListAllOptions { show_hidden: true };
        assert_eq!(
            listall_command(&keywords, &options).args(),
            &["board", "listall", "mkr", "wifi", "-a"]
        );
    }

    #[test]
    fn test_search_uses_search_subcommand() {
        let keywords = vec!["nano".to_string()];
        assert_eq!(
            search_command(&keywords, &ListAllOptions::default()).args(),
            &["board", "search", "nano"]
        );
    }

    #[test]
    fn test_facade_invokes_list() {
        let runner = RecordingRunner::succeeding(b"Port Type Board Name\n");
        let invoker = stub_invoker(&runner);

        let out = Board::new(&invoker).list(&ListOptions::default()).unwrap();

        assert_eq!(out, b"Port Type Board Name\n");
        assert_eq!(runner.single_call(), vec!["board", "list"]);
    }
}
