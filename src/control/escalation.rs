// src/control/escalation.rs

//! Signal escalation: liveness probing and the SIGTERM -> SIGKILL ladder.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::os::{PidSet, ProcessTable, Signal, SignalSender};

/// Default pause after each escalation step.
pub const DEFAULT_ESCALATION_WAIT: Duration = Duration::from_millis(500);

/// One rung of the ladder: send `signal`, then give targets `wait` to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationStep {
    pub signal: Signal,
    pub wait: Duration,
}

/// Ordered list of escalation steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationPolicy {
    pub steps: Vec<EscalationStep>,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::with_wait(DEFAULT_ESCALATION_WAIT)
    }
}

impl EscalationPolicy {
    /// SIGTERM, SIGTERM, SIGKILL with the same pause after each.
    pub fn with_wait(wait: Duration) -> Self {
        Self {
            steps: [Signal::Term, Signal::Term, Signal::Kill]
                .into_iter()
                .map(|signal| EscalationStep { signal, wait })
                .collect(),
        }
    }

    pub fn new(steps: Vec<EscalationStep>) -> Self {
        Self { steps }
    }
}

/// Runs signal delivery against a process table.
pub struct Escalator<'a> {
    table: &'a dyn ProcessTable,
    signals: &'a dyn SignalSender,
}

impl<'a> Escalator<'a> {
    pub fn new(table: &'a dyn ProcessTable, signals: &'a dyn SignalSender) -> Self {
        Self { table, signals }
    }

    /// Whether any of `pids` still exists as a live (non-zombie) process.
    ///
    /// Each PID is probed on its own: `kill -0 a b` fails as a whole when only
    /// one of them is gone.
    pub fn any_alive(&self, pids: &PidSet) -> bool {
        if pids.is_empty() {
            return false;
        }
        let defunct = self.table.defunct(pids);
        pids.iter()
            .filter(|pid| !defunct.contains(pid))
            .any(|pid| self.signals.send(&PidSet::from([*pid]), Signal::Probe))
    }

    /// Send `signal` to `pids` unless the set is empty.
    pub fn deliver(&self, pids: &PidSet, signal: Signal) -> bool {
        if pids.is_empty() {
            return false;
        }
        let ok = self.signals.send(pids, signal);
        if !ok {
            debug!(?pids, %signal, "signal not delivered to every target");
        }
        ok
    }

    /// Walk the policy until nothing in `pids` is alive.
    ///
    /// Returns `true` if something survived every step.
    pub fn escalate(&self, pids: &PidSet, policy: &EscalationPolicy) -> bool {
        for (round, step) in policy.steps.iter().enumerate() {
            if !self.any_alive(pids) {
                debug!(round, "all targets gone");
                return false;
            }
            debug!(round, signal = %step.signal, ?pids, "escalating");
            self.deliver(pids, step.signal);
            pause(step.wait);
        }

        let survivors = self.any_alive(pids);
        if survivors {
            warn!(?pids, "processes survived every escalation step");
        }
        survivors
    }
}

/// Sleep for `wait`, skipping zero-length waits.
pub(crate) fn pause(wait: Duration) {
    if !wait.is_zero() {
        thread::sleep(wait);
    }
}
