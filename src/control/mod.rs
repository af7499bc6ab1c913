// src/control/mod.rs

//! Process supervisor.
//!
//! A [`Control`] owns one resolved [`ProcessConfig`] and answers
//! start/stop/status for it. It keeps no record of what it spawned: every
//! answer is re-derived from the live process table, so any number of
//! `Control`s (in this or other processes) built from the same spec agree on
//! the state of the same real processes.
//!
//! - [`spec`] holds the input (`ProcessSpec`) and resolved (`ProcessConfig`)
//!   forms.
//! - [`resolve`] turns names into spawnable executables.
//! - [`escalation`] holds the signal ladder used by `stop`.

pub mod escalation;
pub mod resolve;
pub mod spec;

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::os::{descendants_of, Backend, Pid, PidSet, Signal};
use crate::types::Status;

pub use escalation::{EscalationPolicy, EscalationStep, Escalator};
pub use spec::{ProcessConfig, ProcessSpec};

/// Default number of status checks after a start/stop command.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 3;

/// Default pause between those checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Timing knobs. The defaults match interactive use; tests shrink them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlOptions {
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    pub escalation: EscalationPolicy,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            escalation: EscalationPolicy::default(),
        }
    }
}

/// Supervisor for one process specification.
#[derive(Debug, Clone)]
pub struct Control {
    config: ProcessConfig,
    options: ControlOptions,
    backend: Backend,
}

impl Control {
    /// Build a control against the real OS with default timings.
    pub fn new(spec: &ProcessSpec) -> Result<Self> {
        Self::with_backend(spec, Backend::real(), ControlOptions::default())
    }

    pub fn with_backend(spec: &ProcessSpec, backend: Backend, options: ControlOptions) -> Result<Self> {
        let config = resolve::resolve_spec(spec, backend.fs.as_ref())?;
        debug!(
            process = %config.name,
            ex_name = %config.ex_name,
            ps_name = %config.ps_name,
            children = ?config.children,
            resolved = config.resolved,
            "process control configured"
        );
        Ok(Self {
            config,
            options,
            backend,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    pub fn ex_name(&self) -> &str {
        &self.config.ex_name
    }

    pub fn ps_name(&self) -> &str {
        &self.config.ps_name
    }

    pub fn args(&self) -> &[String] {
        &self.config.args
    }

    /// Executable followed by its arguments, as it will be spawned.
    pub fn command_line(&self) -> Vec<String> {
        self.config.start_cmd()
    }

    pub fn children(&self) -> &[String] {
        &self.config.children
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.config.cwd.as_deref()
    }

    pub fn stop_cmd(&self) -> Option<&[String]> {
        self.config.stop_cmd.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.config.resolved
    }

    pub fn options(&self) -> &ControlOptions {
        &self.options
    }

    /// Current state, derived from the process table.
    pub fn status(&self) -> Status {
        let primary = self.lookup_one(&self.config.ps_name);
        let children_found = self
            .config
            .children
            .iter()
            .filter(|child| !self.lookup_one(child).is_empty())
            .count();

        Status::from_presence(!primary.is_empty(), children_found, self.config.children.len())
    }

    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    /// PIDs of the named children followed by those of the primary.
    pub fn pids(&self) -> Vec<Pid> {
        let children = self.lookup_live(&self.config.children);
        let primary = self.lookup_one(&self.config.ps_name);
        children.into_iter().chain(primary).collect()
    }

    /// Start the process unless something of it is already running.
    ///
    /// Returns the first non-`Stopped` status seen while polling, or
    /// `Stopped` if the process never showed up.
    pub fn start(&self) -> Status {
        if !self.config.resolved {
            warn!(
                process = %self.config.name,
                executable = %self.config.ex_name,
                "executable was not resolved; not starting"
            );
            return Status::Stopped;
        }

        let current = self.status();
        if current != Status::Stopped {
            debug!(process = %self.config.name, status = %current, "already running; start is a no-op");
            return current;
        }

        let argv = self.command_line();
        info!(process = %self.config.name, cmd = ?argv, "starting process");
        self.run_detached(&argv);
        self.poll_until(|status| status != Status::Stopped)
    }

    /// Stop the process, its named children and any descendants found in the
    /// process table.
    ///
    /// Never fails; the returned status tells whether anything survived.
    pub fn stop(&self) -> Status {
        if let Some(stop_cmd) = self.config.stop_cmd.as_ref() {
            info!(process = %self.config.name, cmd = ?stop_cmd, "running stop command");
            self.run_detached(stop_cmd);
            return self.poll_until(|status| status == Status::Stopped);
        }

        let table = self.backend.table.as_ref();
        let primary = self.lookup_one(&self.config.ps_name);
        let named = self.lookup_live(&self.config.children);

        let tracked: PidSet = primary.union(&named).copied().collect();
        let discovered = descendants_of(table, &tracked);
        let all: PidSet = tracked.union(&discovered).copied().collect();

        if all.is_empty() {
            debug!(process = %self.config.name, "nothing running; stop is a no-op");
            return Status::Stopped;
        }

        info!(
            process = %self.config.name,
            primary = ?primary,
            children = ?named,
            descendants = ?discovered,
            "stopping process tree"
        );

        // Children before the primary, so it cannot respawn them; discovered
        // descendants go last.
        let escalator = Escalator::new(table, self.backend.signals.as_ref());
        let named_only: PidSet = named.difference(&primary).copied().collect();
        escalator.deliver(&named_only, Signal::Term);
        escalator.deliver(&primary, Signal::Term);
        escalator.deliver(&discovered, Signal::Term);

        escalator.escalate(&all, &self.options.escalation);

        let status = self.status();
        info!(process = %self.config.name, status = %status, "stop finished");
        status
    }

    /// `stop()` followed by `start()`.
    pub fn restart(&self) -> Status {
        let stopped = self.stop();
        if stopped != Status::Stopped {
            warn!(process = %self.config.name, status = %stopped, "restart: process did not stop cleanly");
        }
        self.start()
    }

    fn lookup_one(&self, name: &str) -> PidSet {
        self.lookup_live(&[name.to_string()])
    }

    /// Table lookup with zombie entries removed; an unreaped orphan is gone
    /// as far as supervision is concerned.
    fn lookup_live(&self, names: &[String]) -> PidSet {
        let table = self.backend.table.as_ref();
        let pids = table.lookup(names);
        if pids.is_empty() {
            return pids;
        }
        let defunct = table.defunct(&pids);
        pids.difference(&defunct).copied().collect()
    }

    fn run_detached(&self, argv: &[String]) {
        if let Err(e) = self.backend.spawner.spawn_detached(argv, self.config.cwd.as_deref()) {
            warn!(
                process = %self.config.name,
                cmd = ?argv,
                error = %e,
                "failed to spawn command"
            );
        }
    }

    /// Check status up to `poll_attempts` times, pausing in between; return
    /// the first status accepted by `done`, or the last one seen.
    fn poll_until(&self, done: impl Fn(Status) -> bool) -> Status {
        let attempts = self.options.poll_attempts.max(1);
        let mut status = self.status();
        for attempt in 1..attempts {
            if done(status) {
                return status;
            }
            debug!(process = %self.config.name, attempt, status = %status, "waiting for process state");
            escalation::pause(self.options.poll_interval);
            status = self.status();
        }
        status
    }
}
