// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::control::{ControlOptions, EscalationPolicy, ProcessSpec};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// poll_attempts = 3
/// poll_interval = "500ms"
///
/// [process.web]
/// cmd = ["./server", "--port", "8080"]
/// cwd = "build"
/// children = ["server-worker"]
/// ```
///
/// `[config]` is optional and has reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Timing behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All processes from `[process.<name>]`.
    ///
    /// Keys become the process `name` when the entry does not set one.
    #[serde(default)]
    pub process: BTreeMap<String, ProcessSpec>,
}

/// `[config]` section. Durations are strings like `"500ms"` or `"2s"`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Status checks after issuing a start or stop command.
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    /// Pause between those checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// Pause after each SIGTERM/SIGTERM/SIGKILL escalation step.
    #[serde(default = "default_escalation_wait")]
    pub escalation_wait: String,

    /// Refresh period of `procctl watch`.
    #[serde(default = "default_status_interval")]
    pub status_interval: String,
}

fn default_poll_attempts() -> u32 {
    3
}

fn default_poll_interval() -> String {
    "500ms".to_string()
}

fn default_escalation_wait() -> String {
    "500ms".to_string()
}

fn default_status_interval() -> String {
    "1s".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            poll_attempts: default_poll_attempts(),
            poll_interval: default_poll_interval(),
            escalation_wait: default_escalation_wait(),
            status_interval: default_status_interval(),
        }
    }
}

/// Parsed form of `[config]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    pub escalation_wait: Duration,
    pub status_interval: Duration,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub timings: Timings,
    /// Keyed by the `[process.<name>]` key; every spec has `name` set.
    pub process: BTreeMap<String, ProcessSpec>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(timings: Timings, process: BTreeMap<String, ProcessSpec>) -> Self {
        Self { timings, process }
    }

    /// Supervisor timings derived from `[config]`.
    pub fn control_options(&self) -> ControlOptions {
        ControlOptions {
            poll_attempts: self.timings.poll_attempts,
            poll_interval: self.timings.poll_interval,
            escalation: EscalationPolicy::with_wait(self.timings.escalation_wait),
        }
    }
}
