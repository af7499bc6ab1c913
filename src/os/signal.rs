// src/os/signal.rs

//! Signal delivery through the `kill` utility.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use super::{PidSet, SignalSender};

/// Signals the supervisor knows how to send.
///
/// `Probe` is signal 0: it checks that a process exists and may be signalled
/// without affecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Probe,
    Hup,
    Int,
    Term,
    Kill,
}

impl Signal {
    /// Argument form understood by `kill`, e.g. `-TERM` or `-0`.
    pub fn as_arg(self) -> &'static str {
        match self {
            Signal::Probe => "-0",
            Signal::Hup => "-HUP",
            Signal::Int => "-INT",
            Signal::Term => "-TERM",
            Signal::Kill => "-KILL",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Probe => "0",
            Signal::Hup => "SIGHUP",
            Signal::Int => "SIGINT",
            Signal::Term => "SIGTERM",
            Signal::Kill => "SIGKILL",
        };
        f.write_str(s)
    }
}

/// Sends signals by running the external `kill` program.
#[derive(Debug, Clone)]
pub struct KillUtility {
    kill: Option<PathBuf>,
}

impl Default for KillUtility {
    fn default() -> Self {
        Self::new()
    }
}

impl KillUtility {
    pub fn new() -> Self {
        let kill = which::which("kill").ok();
        if kill.is_none() {
            debug!("`kill` not found on PATH; signal delivery will always fail");
        }
        Self { kill }
    }
}

impl SignalSender for KillUtility {
    fn send(&self, pids: &PidSet, signal: Signal) -> bool {
        if pids.is_empty() {
            return false;
        }
        let Some(kill) = self.kill.as_ref() else {
            return false;
        };

        let status = Command::new(kill)
            .arg(signal.as_arg())
            .args(pids.iter().map(|pid| pid.to_string()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) => {
                if signal != Signal::Probe {
                    debug!(?pids, %signal, success = status.success(), "signal delivered");
                }
                status.success()
            }
            Err(e) => {
                debug!(?pids, %signal, error = %e, "failed to run kill");
                false
            }
        }
    }
}
