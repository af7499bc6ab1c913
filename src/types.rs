// src/types.rs

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Aggregated state of a supervised unit, derived from the process table.
///
/// - `Stopped`: neither the primary process nor any named child is present.
/// - `Jeopardy`: a partial match (primary missing but some children present,
///   or primary present with some children missing).
/// - `Running`: the primary and every named child are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Stopped = -1,
    Jeopardy = 0,
    Running = 1,
}

impl Status {
    /// Anything other than `Stopped` counts as running.
    pub fn is_running(self) -> bool {
        self != Status::Stopped
    }

    /// Decide the status from what the table reported.
    ///
    /// `children_found` is the number of *distinct expected names* that
    /// matched at least one PID, not the number of PIDs.
    pub fn from_presence(primary_found: bool, children_found: usize, children_expected: usize) -> Self {
        match (primary_found, children_found) {
            (false, 0) => Status::Stopped,
            (false, _) => Status::Jeopardy,
            (true, n) if n >= children_expected => Status::Running,
            (true, _) => Status::Jeopardy,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Stopped => "STOPPED",
            Status::Jeopardy => "JEOPARDY",
            Status::Running => "RUNNING",
        };
        f.write_str(s)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stopped" => Ok(Status::Stopped),
            "jeopardy" => Ok(Status::Jeopardy),
            "running" => Ok(Status::Running),
            other => Err(format!(
                "invalid status: {other} (expected \"stopped\", \"jeopardy\" or \"running\")"
            )),
        }
    }
}

/// Parse durations written as an integer plus unit: `250ms`, `3s`, `1m`,
/// `2h`. Whitespace between number and unit is allowed.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .filter(|&at| at > 0)
        .ok_or_else(|| format!("invalid duration '{s}': expected e.g. 500ms, 2s, 1m"))?;

    let (digits, unit) = s.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|e| format!("invalid duration '{s}': {e}"))?;

    let millis_per_unit: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        other => return Err(format!("unknown duration unit '{other}' in '{s}' (use ms, s, m or h)")),
    };
    value
        .checked_mul(millis_per_unit)
        .map(Duration::from_millis)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
