//! ardcli - typed front end for arduino-cli.

use ardcli::cli::{
    BoardCommands, CacheCommands, Cli, Commands, ConfigCommands, CoreCommands, DaemonArgs,
    IndexCommands, LibCommands, SketchCommands,
};
use ardcli::commands::board::{AttachOptions, DetailsOptions, ListAllOptions, ListOptions};
use ardcli::commands::build::{
    BurnBootloaderOptions, DebugOptions, MonitorOptions, UploadOptions,
};
use ardcli::commands::config::InitOptions;
use ardcli::commands::{core as platform, library, sketch};
use ardcli::config::{self, ConfigFile};
use ardcli::daemon::{DaemonHandle, is_listening};
use ardcli::process::GlobalOptions;
use ardcli::{ArduinoCli, ArduinoCliBuilder, Error, Result, index};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How often the foreground daemon checks for Ctrl-C or an exited child.
const DAEMON_POLL_MS: u64 = 250;

fn main() {
    init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(exit_code(&e));
    }
}

/// Log to stderr; `ARDCLI_LOG` takes `EnvFilter` syntax and defaults to `warn`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("ARDCLI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Exit with arduino-cli's own exit code when it failed, 1 otherwise.
fn exit_code(err: &Error) -> i32 {
    match err {
        Error::CommandFailed { code: Some(code) } if *code != 0 => *code,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<()> {
    let globals = cli.globals.into_options();

    // Reading a config file or checking indexes does not need arduino-cli.
    match cli.command {
        Commands::Config {
            command: ConfigCommands::Read { path },
        } => write_output(&read_config(config_path(path, &globals)?)?),
        Commands::Index {
            command: IndexCommands::Check { urls },
        } => check_indexes(urls, &globals),
        command => {
            let mut builder = ArduinoCliBuilder::new()
                .globals(globals)
                .check_install(!cli.no_install_check)
                .no_daemon();
            if let Some(path) = cli.cli_path {
                builder = builder.program(path);
            }
            let session = builder.build()?;
            run_command(&session, command)
        }
    }
}

fn run_command(session: &ArduinoCli, command: Commands) -> Result<()> {
    let output = match command {
        Commands::Board { command } => run_board(session, command)?,
        Commands::BurnBootloader { target, verify } => {
            session.burn_bootloader(&BurnBootloaderOptions {
                target: target.into_options(),
                verify,
            })?
        }
        Commands::Cache {
            command: CacheCommands::Clean,
        } => session.cache_clean()?,
        Commands::Compile(args) => session.compile(&args.into_options())?,
        Commands::Completion {
            shell,
            no_descriptions,
            output,
        } => session.completion(shell, no_descriptions, output.as_deref())?,
        Commands::Config { command } => run_config(session, command)?,
        Commands::Core { command } => run_core(session, command)?,
        Commands::Daemon(args) => return run_daemon(session, args),
        Commands::Debug {
            target,
            input_dir,
            interpreter,
            info,
            sketch,
        } => session.debug(&DebugOptions {
            sketch,
            target: target.into_options(),
            input_dir,
            interpreter,
            info,
        })?,
        Commands::Index { .. } => unreachable!("index commands run before a session is built"),
        Commands::Lib { command } => run_lib(session, command)?,
        Commands::Monitor {
            port,
            fqbn,
            config,
            describe,
            protocol,
            quiet,
            discovery_timeout,
        } => session.monitor(&MonitorOptions {
            port,
            fqbn,
            config,
            describe,
            protocol,
            quiet,
            discovery_timeout,
        })?,
        Commands::Outdated => session.outdated()?,
        Commands::Sketch { command } => run_sketch(session, command)?,
        Commands::Update { show_outdated } => session.update(show_outdated)?,
        Commands::Upgrade { post_install } => session.upgrade(&post_install.into_options())?,
        Commands::Upload {
            target,
            input_file,
            input_dir,
            verify,
            sketch,
        } => session.upload(&UploadOptions {
            sketch,
            target: target.into_options(),
            input_file,
            input_dir,
            verify,
        })?,
        Commands::Version => session.version()?,
    };

    write_output(&output)
}

fn run_board(session: &ArduinoCli, command: BoardCommands) -> Result<Vec<u8>> {
    let board = session.board();
    match command {
        BoardCommands::Attach {
            fqbn,
            port,
            protocol,
            discovery_timeout,
            sketch,
        } => board.attach(&AttachOptions {
            fqbn,
            port,
            protocol,
            discovery_timeout,
            sketch,
        }),
        BoardCommands::Details {
            fqbn,
            full,
            list_programmers,
        } => board.details(
            &fqbn,
            &DetailsOptions {
                full,
                list_programmers,
            },
        ),
        BoardCommands::List {
            watch,
            discovery_timeout,
        } => board.list(&ListOptions {
            watch,
            discovery_timeout,
        }),
        BoardCommands::Listall {
            keywords,
            show_hidden,
        } => board.list_all(&keywords, &ListAllOptions { show_hidden }),
        BoardCommands::Search {
            keywords,
            show_hidden,
        } => board.search(&keywords, &ListAllOptions { show_hidden }),
    }
}

fn run_config(session: &ArduinoCli, command: ConfigCommands) -> Result<Vec<u8>> {
    let config = session.config();
    match command {
        ConfigCommands::Add { key, values } => config.add(&key, &values),
        ConfigCommands::Delete { key } => config.delete(&key),
        ConfigCommands::Dump => config.dump(),
        ConfigCommands::Init {
            dest_dir,
            dest_file,
            overwrite,
        } => config.init(&InitOptions {
            dest_dir,
            dest_file,
            overwrite,
        }),
        ConfigCommands::Remove { key, values } => config.remove(&key, &values),
        ConfigCommands::Set { key, values } => config.set(&key, &values),
        ConfigCommands::Read { .. } => unreachable!("config read runs before a session is built"),
        ConfigCommands::Ensure { path } => {
            let path = config_path(path, session.invoker().globals())?;
            let created = config.ensure_file(&path)?;
            let status = if created { "created" } else { "exists" };
            Ok(format!("{}: {}\n", status, path.display()).into_bytes())
        }
    }
}

fn run_core(session: &ArduinoCli, command: CoreCommands) -> Result<Vec<u8>> {
    let cores = session.core();
    match command {
        CoreCommands::Download { cores: names } => cores.download(&names),
        CoreCommands::Install { core, post_install } => {
            cores.install(&core, &post_install.into_options())
        }
        CoreCommands::List { all, updatable } => {
            cores.list(&platform::ListOptions { all, updatable })
        }
        CoreCommands::Search { keywords, all } => {
            cores.search(&keywords, &platform::SearchOptions { all })
        }
        CoreCommands::Uninstall { cores: names } => cores.uninstall(&names),
        CoreCommands::UpdateIndex => cores.update_index(),
        CoreCommands::Upgrade { core, post_install } => {
            cores.upgrade(core.as_deref(), &post_install.into_options())
        }
    }
}

fn run_lib(session: &ArduinoCli, command: LibCommands) -> Result<Vec<u8>> {
    let lib = session.lib();
    match command {
        LibCommands::Deps { library } => lib.deps(&library),
        LibCommands::Download { libraries } => lib.download(&libraries),
        LibCommands::Examples { library, fqbn } => {
            lib.examples(library.as_deref(), &library::ExamplesOptions { fqbn })
        }
        LibCommands::Install {
            libraries,
            git_url,
            zip_path,
            no_deps,
        } => lib.install_many(
            &libraries,
            &library::InstallOptions {
                git_url,
                zip_path,
                no_deps,
            },
        ),
        LibCommands::List {
            library,
            all,
            fqbn,
            updatable,
        } => lib.list(
            library.as_deref(),
            &library::ListOptions {
                all,
                fqbn,
                updatable,
            },
        ),
        LibCommands::Search { keywords, names } => {
            lib.search(&keywords, &library::SearchOptions { names })
        }
        LibCommands::Uninstall { libraries } => lib.uninstall(&libraries),
        LibCommands::UpdateIndex => lib.update_index(),
        LibCommands::Upgrade { libraries } => lib.upgrade(&libraries),
    }
}

fn run_sketch(session: &ArduinoCli, command: SketchCommands) -> Result<Vec<u8>> {
    match command {
        SketchCommands::Archive {
            sketch,
            archive,
            include_build_dir,
        } => session.sketch().archive(&sketch::ArchiveOptions {
            sketch_path: sketch,
            archive_path: archive,
            include_build_dir,
        }),
        SketchCommands::New { name } => session.sketch().create(&name),
    }
}

/// Run the daemon as a child of this process until Ctrl-C, then stop it.
fn run_daemon(session: &ArduinoCli, args: DaemonArgs) -> Result<()> {
    let options = args.into_options();
    let port = options.effective_port();
    if is_listening(port) {
        eprintln!("arduino-cli daemon already running on port {}", port);
        return Ok(());
    }

    let handle = DaemonHandle::start(session.invoker(), &options)?;
    eprintln!(
        "arduino-cli daemon running on port {} (Ctrl-C to stop)",
        handle.port()
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| Error::Io(io::Error::other(e)))?;

    while running.load(Ordering::SeqCst) {
        if let Some(status) = handle.try_wait()? {
            handle.stop();
            return Err(Error::CommandFailed {
                code: status.code(),
            });
        }
        thread::sleep(Duration::from_millis(DAEMON_POLL_MS));
    }

    tracing::info!("shutdown signal received");
    handle.stop();
    Ok(())
}

/// Explicit path, then `--config-file`, then arduino-cli's default location.
fn config_path(path: Option<PathBuf>, globals: &GlobalOptions) -> Result<PathBuf> {
    path.or_else(|| globals.config_file.clone())
        .or_else(config::default_path)
        .ok_or_else(|| Error::InvalidInput("cannot determine home directory".to_string()))
}

/// Decode a configuration file and render it as JSON.
fn read_config(path: PathBuf) -> Result<Vec<u8>> {
    let config = ConfigFile::load(&path)?;
    let mut json = serde_json::to_string_pretty(&config)?;
    json.push('\n');
    Ok(json.into_bytes())
}

fn check_indexes(urls: Vec<String>, globals: &GlobalOptions) -> Result<()> {
    let urls = if urls.is_empty() {
        let mut configured = Vec::new();
        let path = config_path(None, globals)?;
        if path.exists() {
            configured.extend(
                ConfigFile::load(&path)?
                    .additional_urls()?
                    .into_iter()
                    .map(String::from),
            );
        }
        configured.extend(globals.additional_urls.iter().cloned());
        configured
    } else {
        urls
    };

    if urls.is_empty() {
        println!("No package index URLs configured");
        return Ok(());
    }

    let mut failures = 0;
    for raw in &urls {
        let result = index::parse_url(raw).and_then(|url| index::fetch(&url));
        match result {
            Ok(package_index) => {
                let cores = package_index.cores();
                println!("ok    {} ({} platform releases)", raw, cores.len());
                for core in cores {
                    println!("      {}", core);
                }
            }
            Err(e) => {
                failures += 1;
                println!("FAIL  {}: {}", raw, e);
            }
        }
    }

    if failures > 0 {
        return Err(Error::InvalidInput(format!(
            "{} of {} package indexes could not be read",
            failures,
            urls.len()
        )));
    }
    Ok(())
}

fn write_output(output: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(output)?;
    stdout.flush()?;
    Ok(())
}
