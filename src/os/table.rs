// src/os/table.rs

//! Process table queries backed by `pidof` and `ps`.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use super::{Pid, PidSet, ProcessTable};

/// Real process table, shelling out to the system utilities.
///
/// Utility paths are looked up once at construction. A missing utility makes
/// the corresponding query return an empty set.
#[derive(Debug, Clone)]
pub struct PsTable {
    pidof: Option<PathBuf>,
    ps: Option<PathBuf>,
}

impl Default for PsTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PsTable {
    pub fn new() -> Self {
        let pidof = which::which("pidof").ok();
        let ps = which::which("ps").ok();
        if pidof.is_none() {
            debug!("`pidof` not found on PATH; name lookups will report nothing");
        }
        if ps.is_none() {
            debug!("`ps` not found on PATH; child/defunct scans will report nothing");
        }
        Self { pidof, ps }
    }

    /// Run a utility and return its stdout if it exited successfully.
    fn capture(program: Option<&PathBuf>, args: &[&str]) -> Option<String> {
        let program = program?;
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        match output {
            Ok(out) if out.status.success() => Some(String::from_utf8_lossy(&out.stdout).into_owned()),
            Ok(out) => {
                trace!(
                    program = %program.display(),
                    ?args,
                    code = ?out.status.code(),
                    "table query exited non-zero; treating as no match"
                );
                None
            }
            Err(e) => {
                debug!(
                    program = %program.display(),
                    error = %e,
                    "failed to run table query; treating as no match"
                );
                None
            }
        }
    }
}

impl ProcessTable for PsTable {
    fn lookup(&self, names: &[String]) -> PidSet {
        let names: Vec<&str> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return PidSet::new();
        }

        Self::capture(self.pidof.as_ref(), &names)
            .map(|out| parse_pid_list(&out))
            .unwrap_or_default()
    }

    fn children_of(&self, parents: &PidSet) -> PidSet {
        if parents.is_empty() {
            return PidSet::new();
        }
        let Some(out) = Self::capture(self.ps.as_ref(), &["ax", "-o", "pid=,ppid="]) else {
            return PidSet::new();
        };

        parse_parent_rows(&out)
            .into_iter()
            .filter(|(_, ppid)| parents.contains(ppid))
            .map(|(pid, _)| pid)
            .collect()
    }

    fn defunct(&self, pids: &PidSet) -> PidSet {
        if pids.is_empty() {
            return PidSet::new();
        }
        let Some(out) = Self::capture(self.ps.as_ref(), &["ax", "-o", "pid=,stat=,command="]) else {
            return PidSet::new();
        };

        parse_defunct_rows(&out)
            .into_iter()
            .filter(|pid| pids.contains(pid))
            .collect()
    }
}

/// Parse whitespace-separated PIDs (`pidof` output). Junk tokens are skipped.
pub fn parse_pid_list(out: &str) -> PidSet {
    out.split_whitespace()
        .filter_map(|tok| tok.parse::<Pid>().ok())
        .collect()
}

/// Parse `pid ppid` rows. Header lines and malformed rows are skipped.
pub fn parse_parent_rows(out: &str) -> Vec<(Pid, Pid)> {
    out.lines()
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let pid = cols.next()?.parse::<Pid>().ok()?;
            let ppid = cols.next()?.parse::<Pid>().ok()?;
            Some((pid, ppid))
        })
        .collect()
}

/// Parse `pid stat command...` rows and return the PIDs marked defunct.
///
/// A row is defunct when its state starts with `Z` or its command carries the
/// `<defunct>` marker.
pub fn parse_defunct_rows(out: &str) -> PidSet {
    out.lines()
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let pid = cols.next()?.parse::<Pid>().ok()?;
            let stat = cols.next().unwrap_or_default();
            let zombie = stat.starts_with('Z') || cols.any(|c| c == "<defunct>");
            zombie.then_some(pid)
        })
        .collect()
}

/// Every descendant of `roots` (children, grandchildren, ...), excluding the
/// roots themselves.
///
/// Follows real parent/child relationships, so helpers that run under a
/// different executable name are still found.
pub fn descendants_of(table: &dyn ProcessTable, roots: &PidSet) -> PidSet {
    let mut found = PidSet::new();
    let mut frontier = roots.clone();

    while !frontier.is_empty() {
        let next: PidSet = table
            .children_of(&frontier)
            .into_iter()
            .filter(|pid| !roots.contains(pid) && !found.contains(pid))
            .collect();
        found.extend(next.iter().copied());
        frontier = next;
    }

    found
}
