//! Options appended to every arduino-cli invocation.

use clap::ValueEnum;
use std::ffi::OsString;
use std::path::PathBuf;

/// Output format requested from arduino-cli (`--format`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    #[value(name = "jsonmini")]
    JsonMini,
    Yaml,
}

impl OutputFormat {
    /// Convert to the spelling arduino-cli expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::JsonMini => "jsonmini",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log line format for arduino-cli's own logging (`--log-format`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity threshold for arduino-cli's own logging (`--log-level`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Panic => "panic",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Session-wide arduino-cli flags.
///
/// Set once when the session is built and appended, after the subcommand's
/// own tokens, to every invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    /// Additional board-manager index URLs (`--additional-urls`, comma-joined)
    pub additional_urls: Vec<String>,
    /// Alternate configuration file (`--config-file`)
    pub config_file: Option<PathBuf>,
    /// Output format (`--format`)
    pub format: Option<OutputFormat>,
    /// Log line format (`--log-format`)
    pub log_format: Option<LogFormat>,
    /// Log destination (`--log-file`)
    pub log_file: Option<PathBuf>,
    /// Log threshold (`--log-level`)
    pub log_level: Option<LogLevel>,
    /// Disable colored output (`--no-color`)
    pub no_color: bool,
    /// Print logs on stdout (`--verbose`)
    pub verbose: bool,
}

impl GlobalOptions {
    /// Create an empty option set; nothing is appended to invocations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render as arduino-cli flags, always in the same order.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        if !self.additional_urls.is_empty() {
            args.push("--additional-urls".into());
            args.push(self.additional_urls.join(",").into());
        }
        if let Some(ref path) = self.config_file {
            args.push("--config-file".into());
            args.push(path.as_os_str().to_owned());
        }
        if let Some(format) = self.format {
            args.push("--format".into());
            args.push(format.as_str().into());
        }
        if let Some(format) = self.log_format {
            args.push("--log-format".into());
            args.push(format.as_str().into());
        }
        if let Some(ref path) = self.log_file {
            args.push("--log-file".into());
            args.push(path.as_os_str().to_owned());
        }
        if let Some(level) = self.log_level {
            args.push("--log-level".into());
            args.push(level.as_str().into());
        }
        if self.no_color {
            args.push("--no-color".into());
        }
        if self.verbose {
            args.push("--verbose".into());
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_add_nothing() {
        assert!(GlobalOptions::new().to_args().is_empty());
    }

    #[test]
    fn test_all_options_in_fixed_order() {
        let options = GlobalOptions {
            additional_urls: vec![
                "https://a.example/index.json".to_string(),
                "https://b.example/index.json".to_string(),
            ],
            config_file: Some(PathBuf::from("/etc/arduino-cli.yaml")),
            format: Some(OutputFormat::Json),
            log_format: Some(LogFormat::Text),
            log_file: Some(PathBuf::from("/tmp/cli.log")),
            log_level: Some(LogLevel::Debug),
            no_color: true,
            verbose: true,
        };

        assert_eq!(
            options.to_args(),
            vec![
                "--additional-urls",
                "https://a.example/index.json,https://b.example/index.json",
                "--config-file",
                "/etc/arduino-cli.yaml",
                "--format",
                "json",
                "--log-format",
                "text",
                "--log-file",
                "/tmp/cli.log",
                "--log-level",
                "debug",
                "--no-color",
                "--verbose",
            ]
        );
    }

    #[test]
    fn test_partial_options() {
        let options = GlobalOptions {
            format: Some(OutputFormat::JsonMini),
            no_color: true,
            ..Default::default()
        };
        assert_eq!(options.to_args(), vec!["--format", "jsonmini", "--no-color"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_config_file_bytes_preserved() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let options = GlobalOptions {
            config_file: Some(PathBuf::from(OsStr::from_bytes(b"/etc/\xfe.yaml"))),
            ..Default::default()
        };
        let args = options.to_args();
        assert_eq!(args[0], "--config-file");
        assert_eq!(args[1].as_bytes(), b"/etc/\xfe.yaml");
    }

    #[test]
    fn test_value_enum_names() {
        assert_eq!(
            OutputFormat::from_str("jsonmini", false).unwrap(),
            OutputFormat::JsonMini
        );
        assert_eq!(LogLevel::from_str("fatal", false).unwrap(), LogLevel::Fatal);
        assert_eq!(LogFormat::Json.to_string(), "json");
    }
}
