//! Sketch build and device commands: `compile`, `upload`, `burn-bootloader`,
//! `debug` and `monitor`.

use super::TargetOptions;
use crate::process::command::{CliCommand, exclusive, requires};
use crate::process::Invoker;
use crate::{Error, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// gcc warning level used by `compile --warnings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WarningLevel {
    None,
    Default,
    More,
    All,
}

impl WarningLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningLevel::None => "none",
            WarningLevel::Default => "default",
            WarningLevel::More => "more",
            WarningLevel::All => "all",
        }
    }
}

impl std::fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options for `compile`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Sketch to compile; arduino-cli uses the current directory when omitted
    pub sketch: Option<PathBuf>,
    /// Board, port and programmer, also used by `--upload`
    pub target: TargetOptions,
    /// Where to cache compiled cores (`--build-cache-path`)
    pub build_cache_path: Option<PathBuf>,
    /// Where to keep intermediate files (`--build-path`)
    pub build_path: Option<PathBuf>,
    /// Overrides of build properties, `key=value` (`--build-property`)
    pub build_properties: Vec<String>,
    /// Ignore cached builds (`--clean`)
    pub clean: bool,
    /// Copy the built binaries into the sketch folder (`-e`)
    pub export_binaries: bool,
    /// Extra library collection directories (`--libraries`)
    pub libraries: Vec<PathBuf>,
    /// Extra single library directories (`--library`)
    pub library: Vec<PathBuf>,
    /// Only produce `compile_commands.json` (`--only-compilation-database`)
    pub only_compilation_database: bool,
    /// Build with debug optimisation settings (`--optimize-for-debug`)
    pub optimize_for_debug: bool,
    /// Where to copy the built binaries (`--output-dir`)
    pub output_dir: Option<PathBuf>,
    /// Print the preprocessed code and exit (`--preprocess`)
    pub preprocess: bool,
    /// Suppress non-error output (`--quiet`)
    pub quiet: bool,
    /// Print build properties instead of compiling (`--show-properties`)
    pub show_properties: bool,
    /// Upload after a successful compile (`-u`)
    pub upload: bool,
    /// Verify the upload; needs `upload` (`-t`)
    pub verify: bool,
    /// Run the build for a specific USB VID/PID (`--vid-pid`)
    pub vid_pid: Option<String>,
    /// gcc warning level (`--warnings`)
    pub warnings: Option<WarningLevel>,
}

/// Options for `upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub sketch: Option<PathBuf>,
    pub target: TargetOptions,
    /// Binary file to upload (`-i`)
    pub input_file: Option<PathBuf>,
    /// Directory holding the binaries to upload (`--input-dir`)
    pub input_dir: Option<PathBuf>,
    /// Verify the upload (`-t`)
    pub verify: bool,
}

/// Options for `burn-bootloader`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BurnBootloaderOptions {
    pub target: TargetOptions,
    /// Verify after burning (`-t`)
    pub verify: bool,
}

/// Options for `debug`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugOptions {
    pub sketch: Option<PathBuf>,
    pub target: TargetOptions,
    /// Directory holding the binaries to debug (`--input-dir`)
    pub input_dir: Option<PathBuf>,
    /// gdb interpreter, e.g. `mi2` (`--interpreter`)
    pub interpreter: Option<String>,
    /// Print debug session information instead of starting it (`--info`)
    pub info: bool,
}

/// Options for `monitor`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Port to open (`-p`); required
    pub port: String,
    pub fqbn: Option<String>,
    /// Port settings, `key=value` (`-c`)
    pub config: Vec<String>,
    /// List the settings the port supports (`--describe`)
    pub describe: bool,
    pub protocol: Option<String>,
    /// Only print data received from the port (`--quiet`)
    pub quiet: bool,
    pub discovery_timeout: Option<String>,
}

pub fn compile_command(options: &CompileOptions) -> Result<CliCommand> {
    requires(("-t", options.verify), ("-u", options.upload))?;

    let cmd = CliCommand::new(["compile"])
        .opt_path("--build-cache-path", options.build_cache_path.as_deref())
        .opt_path("--build-path", options.build_path.as_deref())
        .repeated("--build-property", &options.build_properties)
        .flag_if("--clean", options.clean)
        .flag_if("-e", options.export_binaries)
        .repeated_paths("--libraries", &options.libraries)
        .repeated_paths("--library", &options.library)
        .flag_if("--only-compilation-database", options.only_compilation_database)
        .flag_if("--optimize-for-debug", options.optimize_for_debug)
        .opt_path("--output-dir", options.output_dir.as_deref())
        .flag_if("--preprocess", options.preprocess)
        .flag_if("--quiet", options.quiet)
        .flag_if("--show-properties", options.show_properties)
        .flag_if("-u", options.upload)
        .flag_if("-t", options.verify)
        .opt_value("--vid-pid", options.vid_pid.as_deref())
        .opt_value("--warnings", options.warnings.map(|w| w.as_str()));

    Ok(options
        .target
        .apply(cmd)
        .opt_path_arg(options.sketch.as_deref()))
}

pub fn upload_command(options: &UploadOptions) -> Result<CliCommand> {
    exclusive(
        ("-i", options.input_file.is_some()),
        ("--input-dir", options.input_dir.is_some()),
    )?;

    let cmd = CliCommand::new(["upload"])
        .opt_path("-i", options.input_file.as_deref())
        .opt_path("--input-dir", options.input_dir.as_deref())
        .flag_if("-t", options.verify);

    Ok(options
        .target
        .apply(cmd)
        .opt_path_arg(options.sketch.as_deref()))
}

pub fn burn_bootloader_command(options: &BurnBootloaderOptions) -> CliCommand {
    options
        .target
        .apply(CliCommand::new(["burn-bootloader"]))
        .flag_if("-t", options.verify)
}

pub fn debug_command(options: &DebugOptions) -> CliCommand {
    let cmd = CliCommand::new(["debug"])
        .opt_path("--input-dir", options.input_dir.as_deref())
        .opt_value("--interpreter", options.interpreter.as_deref())
        .flag_if("--info", options.info);

    options
        .target
        .apply(cmd)
        .opt_path_arg(options.sketch.as_deref())
}

pub fn monitor_command(options: &MonitorOptions) -> Result<CliCommand> {
    if options.port.trim().is_empty() {
        return Err(Error::InvalidInput("monitor requires a port (-p)".to_string()));
    }

    Ok(CliCommand::new(["monitor"])
        .value("-p", options.port.as_str())
        .opt_value("-b", options.fqbn.as_deref())
        .repeated("-c", &options.config)
        .flag_if("--describe", options.describe)
        .opt_value("-l", options.protocol.as_deref())
        .flag_if("--quiet", options.quiet)
        .opt_value("--discovery-timeout", options.discovery_timeout.as_deref()))
}

/// Build and device operations bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct Build<'a> {
    invoker: &'a Invoker,
}

impl<'a> Build<'a> {
    pub fn new(invoker: &'a Invoker) -> Self {
        Self { invoker }
    }

    /// Compile a sketch, optionally uploading it.
    pub fn compile(&self, options: &CompileOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(compile_command(options)?)
    }

    /// Upload a compiled sketch to a board.
    pub fn upload(&self, options: &UploadOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(upload_command(options)?)
    }

    /// Burn the bootloader using an external programmer.
    pub fn burn_bootloader(&self, options: &BurnBootloaderOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(burn_bootloader_command(options))
    }

    /// Start a debug session, or print its parameters with `info`.
    pub fn debug(&self, options: &DebugOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(debug_command(options))
    }

    /// Open a port monitor.
    ///
    /// Output is captured, so this returns only once the monitor exits.
    /// With `describe` set it returns right away with the port settings.
    pub fn monitor(&self, options: &MonitorOptions) -> Result<Vec<u8>> {
        self.invoker.invoke(monitor_command(options)?)
    }
}
