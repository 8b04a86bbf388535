//! arduino-cli daemon lifecycle.
//!
//! `arduino-cli daemon` runs the tool as a gRPC server. This module provides
//! [`DaemonHandle`] for spawning it as a supervised child process and a TCP
//! liveness probe used to avoid starting a second instance.

use crate::process::{CliCommand, Invoker};
use crate::{Error, Result};
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Port arduino-cli's gRPC daemon listens on unless told otherwise.
pub const DEFAULT_DAEMON_PORT: u16 = 50051;

/// How long a liveness probe waits for the TCP handshake.
const PROBE_TIMEOUT_MS: u64 = 500;

/// Grace period before killing a daemon that ignored SIGTERM.
const SHUTDOWN_GRACE_SECS: u64 = 5;

/// Flags for `arduino-cli daemon`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonOptions {
    /// Do not terminate the daemon if the parent process dies (`--daemonize`)
    pub daemonize: bool,
    /// Enable debug logging of gRPC calls (`--debug`)
    pub debug: bool,
    /// Only log the named gRPC calls (`--debug-filter`, repeatable)
    pub debug_filter: Vec<String>,
    /// TCP port to listen on (`--port`)
    pub port: Option<u16>,
}

impl DaemonOptions {
    /// Port the daemon will listen on.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_DAEMON_PORT)
    }
}

/// Build the `daemon` argument vector.
pub fn daemon_command(options: &DaemonOptions) -> CliCommand {
    CliCommand::new(["daemon"])
        .flag_if("--daemonize", options.daemonize)
        .flag_if("--debug", options.debug)
        .repeated("--debug-filter", &options.debug_filter)
        .opt_value("--port", options.port.map(|p| p.to_string()).as_deref())
}

/// Check whether something accepts TCP connections on `127.0.0.1:port`.
///
/// Only the handshake is attempted; nothing is sent.
pub fn is_listening(port: u16) -> bool {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    TcpStream::connect_timeout(&addr, Duration::from_millis(PROBE_TIMEOUT_MS)).is_ok()
}

/// A running arduino-cli daemon started by this process.
///
/// Dropping the handle does not stop the daemon; call [`DaemonHandle::stop`].
#[derive(Debug)]
pub struct DaemonHandle {
    port: u16,
    child: Mutex<Option<Child>>,
}

impl DaemonHandle {
    /// Spawn `arduino-cli daemon` in the background.
    ///
    /// The session's global options are appended like for any other command.
    /// Returns as soon as the process is spawned; use [`DaemonHandle::is_running`]
    /// to see whether it accepts connections yet.
    ///
    /// # Errors
    /// - `Launch` if the process cannot be spawned
    pub fn start(invoker: &Invoker, options: &DaemonOptions) -> Result<Self> {
        let argv = invoker.argv(&daemon_command(options));
        let program = invoker.program().to_path_buf();

        let child = Command::new(&program)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| Error::Launch { program, source })?;

        tracing::info!(pid = child.id(), port = options.effective_port(), "started arduino-cli daemon");

        Ok(Self::from_child(child, options.effective_port()))
    }

    pub(crate) fn from_child(child: Child, port: u16) -> Self {
        Self {
            port,
            child: Mutex::new(Some(child)),
        }
    }

    /// Port the daemon was asked to listen on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Process id of the child, if it has not been stopped.
    pub fn pid(&self) -> Option<u32> {
        self.lock_child().as_ref().map(Child::id)
    }

    /// Check whether the daemon port accepts connections.
    pub fn is_running(&self) -> bool {
        is_listening(self.port)
    }

    /// Check whether the child process is still alive.
    ///
    /// Returns `false` once [`DaemonHandle::stop`] has been called.
    pub fn is_alive(&self) -> bool {
        match self.lock_child().as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Exit status of the child if it has exited, without blocking.
    ///
    /// Returns `None` while it is running and after [`DaemonHandle::stop`].
    pub fn try_wait(&self) -> Result<Option<ExitStatus>> {
        match self.lock_child().as_mut() {
            Some(child) => Ok(child.try_wait()?),
            None => Ok(None),
        }
    }

    /// Stop the daemon.
    ///
    /// Sends SIGTERM first, waits up to 5 seconds, then SIGKILL if needed.
    /// Calling this again, or after the daemon already exited, does nothing.
    pub fn stop(&self) {
        let child = self.lock_child().take();
        if let Some(mut child) = child {
            terminate(&mut child);
            tracing::info!(pid = child.id(), "stopped arduino-cli daemon");
        }
    }

    fn lock_child(&self) -> std::sync::MutexGuard<'_, Option<Child>> {
        // A panic while holding the lock leaves the slot itself consistent.
        self.child.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    if let Ok(Some(_)) = child.try_wait() {
        return;
    }

    let pid = Pid::from_raw(child.id() as i32);
    if kill(pid, Signal::SIGTERM).is_err() {
        force_kill(child);
        return;
    }

    match child.wait_timeout(Duration::from_secs(SHUTDOWN_GRACE_SECS)) {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(pid = child.id(), "daemon ignored SIGTERM, killing");
            force_kill(child);
        }
        Err(_) => force_kill(child),
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    force_kill(child);
}

fn force_kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
