//! CLI argument definitions for ardcli.

use crate::commands::build::{CompileOptions, WarningLevel};
use crate::commands::maintenance::Shell;
use crate::commands::{PostInstallOptions, TargetOptions};
use crate::daemon::DaemonOptions;
use crate::process::{GlobalOptions, LogFormat, LogLevel, OutputFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("ARDCLI_GIT_COMMIT"),
    ", built ",
    env!("ARDCLI_BUILD_TIMESTAMP"),
    ")"
);

/// ardcli - run arduino-cli with typed, validated options.
///
/// Every subcommand maps onto the arduino-cli command of the same name.
/// Invalid option combinations are rejected before arduino-cli is launched.
#[derive(Parser, Debug)]
#[command(name = "ardcli")]
#[command(author, version, long_version = LONG_VERSION, about = "Typed front end for arduino-cli", long_about = None)]
pub struct Cli {
    /// Path to the arduino-cli executable (skips the search)
    #[arg(long, global = true, env = "ARDCLI_CLI_PATH")]
    pub cli_path: Option<PathBuf>,

    /// Do not check for (or install) arduino-cli with Homebrew
    #[arg(long, global = true, env = "ARDCLI_NO_INSTALL_CHECK")]
    pub no_install_check: bool,

    #[command(flatten)]
    pub globals: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags forwarded to every arduino-cli invocation.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Additional board-manager index URLs
    #[arg(long, global = true, value_delimiter = ',')]
    pub additional_urls: Vec<String>,

    /// arduino-cli configuration file
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    /// arduino-cli output format
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// arduino-cli log format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// arduino-cli log file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// arduino-cli log level
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Disable colored output from arduino-cli
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Ask arduino-cli to print its logs on stdout
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn into_options(self) -> GlobalOptions {
        GlobalOptions {
            additional_urls: self.additional_urls,
            config_file: self.config_file,
            format: self.format,
            log_format: self.log_format,
            log_file: self.log_file,
            log_level: self.log_level,
            no_color: self.no_color,
            verbose: self.verbose,
        }
    }
}

/// Board, port and programmer selection.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Fully Qualified Board Name, e.g. arduino:avr:uno
    #[arg(short = 'b', long)]
    pub fqbn: Option<String>,

    /// Port address, e.g. COM3 or /dev/ttyACM2
    #[arg(short = 'p', long)]
    pub port: Option<String>,

    /// Programmer to use, e.g. atmel_ice
    #[arg(short = 'P', long)]
    pub programmer: Option<String>,

    /// Port protocol, e.g. serial
    #[arg(short = 'l', long)]
    pub protocol: Option<String>,

    /// Max time to wait for port discovery, e.g. 30s
    #[arg(long)]
    pub discovery_timeout: Option<String>,
}

impl TargetArgs {
    pub fn into_options(self) -> TargetOptions {
        TargetOptions {
            fqbn: self.fqbn,
            port: self.port,
            programmer: self.programmer,
            protocol: self.protocol,
            discovery_timeout: self.discovery_timeout,
        }
    }
}

/// Post-install script handling.
#[derive(Args, Debug, Clone, Default)]
pub struct PostInstallArgs {
    /// Force post-install scripts to run
    #[arg(long)]
    pub run_post_install: bool,

    /// Skip post-install scripts
    #[arg(long)]
    pub skip_post_install: bool,
}

impl PostInstallArgs {
    pub fn into_options(self) -> PostInstallOptions {
        PostInstallOptions {
            run_post_install: self.run_post_install,
            skip_post_install: self.skip_post_install,
        }
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Board commands
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },

    /// Burn the bootloader with an external programmer
    BurnBootloader {
        #[command(flatten)]
        target: TargetArgs,

        /// Verify after burning
        #[arg(short = 't', long)]
        verify: bool,
    },

    /// Cache commands
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Compile a sketch
    Compile(CompileArgs),

    /// Generate a shell completion script
    Completion {
        #[arg(value_enum)]
        shell: Shell,

        /// Leave command descriptions out of the script
        #[arg(long)]
        no_descriptions: bool,

        /// Also write the script to this file
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// arduino-cli configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Core (platform) commands
    Core {
        #[command(subcommand)]
        command: CoreCommands,
    },

    /// Run the arduino-cli gRPC daemon in the foreground until interrupted
    Daemon(DaemonArgs),

    /// Debug a sketch on a board
    Debug {
        #[command(flatten)]
        target: TargetArgs,

        /// Directory holding the binaries to debug
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// gdb interpreter, e.g. console or mi2
        #[arg(long)]
        interpreter: Option<String>,

        /// Print debug session information instead of starting it
        #[arg(short = 'I', long)]
        info: bool,

        /// Sketch path
        sketch: Option<PathBuf>,
    },

    /// Board-manager package index commands
    Index {
        #[command(subcommand)]
        command: IndexCommands,
    },

    /// Library commands
    Lib {
        #[command(subcommand)]
        command: LibCommands,
    },

    /// Open a communication port with a board
    Monitor {
        /// Port address
        #[arg(short = 'p', long)]
        port: String,

        #[arg(short = 'b', long)]
        fqbn: Option<String>,

        /// Port setting as key=value (repeatable)
        #[arg(short = 'c', long = "config")]
        config: Vec<String>,

        /// Show the settings the port supports
        #[arg(long)]
        describe: bool,

        #[arg(short = 'l', long)]
        protocol: Option<String>,

        /// Only print data received from the port
        #[arg(short = 'q', long)]
        quiet: bool,

        #[arg(long)]
        discovery_timeout: Option<String>,
    },

    /// List cores and libraries that can be upgraded
    Outdated,

    /// Sketch commands
    Sketch {
        #[command(subcommand)]
        command: SketchCommands,
    },

    /// Update the core and library indexes
    Update {
        /// Show outdated cores and libraries after the update
        #[arg(long)]
        show_outdated: bool,
    },

    /// Upgrade installed cores and libraries
    Upgrade {
        #[command(flatten)]
        post_install: PostInstallArgs,
    },

    /// Upload a compiled sketch to a board
    Upload {
        #[command(flatten)]
        target: TargetArgs,

        /// Binary file to upload
        #[arg(short = 'i', long)]
        input_file: Option<PathBuf>,

        /// Directory holding the binaries to upload
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Verify the upload
        #[arg(short = 't', long)]
        verify: bool,

        /// Sketch path
        sketch: Option<PathBuf>,
    },

    /// Print arduino-cli's version
    Version,
}

/// Compile arguments
#[derive(Args, Debug, Clone, Default)]
pub struct CompileArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Where to cache compiled cores
    #[arg(long)]
    pub build_cache_path: Option<PathBuf>,

    /// Where to keep intermediate build files
    #[arg(long)]
    pub build_path: Option<PathBuf>,

    /// Build property override as key=value (repeatable)
    #[arg(long = "build-property")]
    pub build_properties: Vec<String>,

    /// Ignore cached builds
    #[arg(long)]
    pub clean: bool,

    /// Copy the binaries into the sketch folder
    #[arg(short = 'e', long)]
    pub export_binaries: bool,

    /// Library collection directory (repeatable)
    #[arg(long)]
    pub libraries: Vec<PathBuf>,

    /// Single library directory (repeatable)
    #[arg(long)]
    pub library: Vec<PathBuf>,

    /// Only produce compile_commands.json
    #[arg(long)]
    pub only_compilation_database: bool,

    /// Build with debug optimisation settings
    #[arg(long)]
    pub optimize_for_debug: bool,

    /// Where to copy the binaries
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print the preprocessed code and exit
    #[arg(long)]
    pub preprocess: bool,

    /// Suppress non-error output
    #[arg(long)]
    pub quiet: bool,

    /// Print build properties instead of compiling
    #[arg(long)]
    pub show_properties: bool,

    /// Upload after compiling
    #[arg(short = 'u', long)]
    pub upload: bool,

    /// Verify the upload (needs --upload)
    #[arg(short = 't', long)]
    pub verify: bool,

    /// Build for a specific USB VID/PID
    #[arg(long)]
    pub vid_pid: Option<String>,

    /// gcc warning level
    #[arg(long, value_enum)]
    pub warnings: Option<WarningLevel>,

    /// Sketch path
    pub sketch: Option<PathBuf>,
}

impl CompileArgs {
    pub fn into_options(self) -> CompileOptions {
        CompileOptions {
            sketch: self.sketch,
            target: self.target.into_options(),
            build_cache_path: self.build_cache_path,
            build_path: self.build_path,
            build_properties: self.build_properties,
            clean: self.clean,
            export_binaries: self.export_binaries,
            libraries: self.libraries,
            library: self.library,
            only_compilation_database: self.only_compilation_database,
            optimize_for_debug: self.optimize_for_debug,
            output_dir: self.output_dir,
            preprocess: self.preprocess,
            quiet: self.quiet,
            show_properties: self.show_properties,
            upload: self.upload,
            verify: self.verify,
            vid_pid: self.vid_pid,
            warnings: self.warnings,
        }
    }
}

/// Daemon arguments
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Keep the daemon running if ardcli dies
    #[arg(long)]
    pub daemonize: bool,

    /// Log gRPC calls
    #[arg(long)]
    pub debug: bool,

    /// Only log the named gRPC calls (repeatable)
    #[arg(long)]
    pub debug_filter: Vec<String>,

    /// TCP port to listen on
    #[arg(long)]
    pub port: Option<u16>,
}

impl DaemonArgs {
    pub fn into_options(self) -> DaemonOptions {
        DaemonOptions {
            daemonize: self.daemonize,
            debug: self.debug,
            debug_filter: self.debug_filter,
            port: self.port,
        }
    }
}

/// Board subcommands
#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// Attach a sketch to a board (exactly one of --fqbn or --port)
    Attach {
        #[arg(short = 'b', long)]
        fqbn: Option<String>,

        #[arg(short = 'p', long)]
        port: Option<String>,

        #[arg(short = 'l', long)]
        protocol: Option<String>,

        #[arg(long)]
        discovery_timeout: Option<String>,

        /// Sketch path
        sketch: Option<PathBuf>,
    },

    /// Print details about a board
    Details {
        #[arg(short = 'b', long)]
        fqbn: String,

        /// Show full board details
        #[arg(short = 'f', long)]
        full: bool,

        /// Show available programmers
        #[arg(long)]
        list_programmers: bool,
    },

    /// List connected boards
    List {
        /// Keep listing on every change
        #[arg(short = 'w', long)]
        watch: bool,

        #[arg(long)]
        discovery_timeout: Option<String>,
    },

    /// List all known boards
    Listall {
        keywords: Vec<String>,

        /// Include hidden boards
        #[arg(short = 'a', long)]
        show_hidden: bool,
    },

    /// Search boards in the Boards Manager
    Search {
        keywords: Vec<String>,

        /// Include hidden boards
        #[arg(short = 'a', long)]
        show_hidden: bool,
    },
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Delete the download cache
    Clean,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Add values to a list setting
    Add {
        key: String,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Delete a setting and its sub keys
    Delete { key: String },

    /// Print the current configuration
    Dump,

    /// Write a new configuration file
    Init {
        #[arg(long)]
        dest_dir: Option<PathBuf>,

        #[arg(long)]
        dest_file: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        overwrite: bool,
    },

    /// Remove values from a list setting
    Remove {
        key: String,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Set a setting
    Set {
        key: String,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Decode a configuration file and print it as JSON
    Read {
        /// File to read (default: --config-file, then arduino-cli's default location)
        path: Option<PathBuf>,
    },

    /// Create the configuration file with `config init` when it does not exist
    Ensure {
        /// File to create (default: --config-file, then arduino-cli's default location)
        path: Option<PathBuf>,
    },
}

/// Core subcommands
#[derive(Subcommand, Debug)]
pub enum CoreCommands {
    /// Download cores without installing them
    Download {
        #[arg(required = true)]
        cores: Vec<String>,
    },

    /// Install a core, e.g. arduino:samd@1.8.13
    Install {
        core: String,

        #[command(flatten)]
        post_install: PostInstallArgs,
    },

    /// List installed cores
    List {
        #[arg(long)]
        all: bool,

        #[arg(long)]
        updatable: bool,
    },

    /// Search cores in the Boards Manager
    Search {
        keywords: Vec<String>,

        /// Show every available version
        #[arg(short = 'a', long)]
        all: bool,
    },

    /// Uninstall cores
    Uninstall {
        #[arg(required = true)]
        cores: Vec<String>,
    },

    /// Update the core index
    UpdateIndex,

    /// Upgrade one core, or all of them
    Upgrade {
        core: Option<String>,

        #[command(flatten)]
        post_install: PostInstallArgs,
    },
}

/// Index subcommands
#[derive(Subcommand, Debug)]
pub enum IndexCommands {
    /// Fetch package indexes and list the cores they offer
    ///
    /// Without URLs, checks board_manager.additional_urls from the
    /// configuration file plus any --additional-urls.
    Check { urls: Vec<String> },
}

/// Lib subcommands
#[derive(Subcommand, Debug)]
pub enum LibCommands {
    /// Check a library's dependencies
    Deps { library: String },

    /// Download libraries without installing them
    Download {
        #[arg(required = true)]
        libraries: Vec<String>,
    },

    /// Show library examples
    Examples {
        library: Option<String>,

        #[arg(short = 'b', long)]
        fqbn: Option<String>,
    },

    /// Install libraries
    Install {
        libraries: Vec<String>,

        /// Arguments are git repository URLs
        #[arg(long)]
        git_url: bool,

        /// Arguments are zip archive paths
        #[arg(long)]
        zip_path: bool,

        /// Do not install dependencies
        #[arg(long)]
        no_deps: bool,
    },

    /// List installed libraries
    List {
        library: Option<String>,

        #[arg(long)]
        all: bool,

        #[arg(short = 'b', long)]
        fqbn: Option<String>,

        #[arg(long)]
        updatable: bool,
    },

    /// Search the library index
    Search {
        keywords: Vec<String>,

        /// Only show names
        #[arg(long)]
        names: bool,
    },

    /// Uninstall libraries
    Uninstall {
        #[arg(required = true)]
        libraries: Vec<String>,
    },

    /// Update the library index
    UpdateIndex,

    /// Upgrade libraries (all when none given)
    Upgrade { libraries: Vec<String> },
}

/// Sketch subcommands
#[derive(Subcommand, Debug)]
pub enum SketchCommands {
    /// Zip a sketch
    Archive {
        sketch: Option<PathBuf>,

        /// Archive path (needs a sketch path)
        archive: Option<PathBuf>,

        #[arg(long)]
        include_build_dir: bool,
    },

    /// Create a new sketch
    New { name: String },
}
