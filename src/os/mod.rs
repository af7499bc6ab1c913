// src/os/mod.rs

//! Operating-system plumbing behind the supervisor.
//!
//! Everything the supervisor needs from the OS goes through three small
//! traits so tests can swap in [`mock::MockHost`]:
//!
//! - [`ProcessTable`] answers questions about the live process table
//!   (`pidof` / `ps` in production, see [`table`]).
//! - [`SignalSender`] delivers signals (the `kill` utility, see [`signal`]).
//! - [`Spawner`] launches a detached process (see [`spawn`]).
//!
//! Query and delivery failures are never errors here: a missing utility, a
//! non-zero exit or unparsable output all mean "nothing found" or "nothing
//! delivered".

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::fs::{FileSystem, RealFileSystem};

pub mod mock;
pub mod signal;
pub mod spawn;
pub mod table;

pub use signal::{KillUtility, Signal};
pub use spawn::DetachedSpawner;
pub use table::{descendants_of, PsTable};

/// OS process identifier.
pub type Pid = u32;

/// Numerically ordered set of PIDs. Always re-queried, never persisted.
pub type PidSet = BTreeSet<Pid>;

/// Read-only view of the OS process table.
pub trait ProcessTable: Send + Sync + Debug {
    /// PIDs of every process whose table name is one of `names`.
    fn lookup(&self, names: &[String]) -> PidSet;

    /// PIDs of every process whose parent PID is in `parents`.
    fn children_of(&self, parents: &PidSet) -> PidSet;

    /// The subset of `pids` that are zombie/defunct table entries.
    fn defunct(&self, pids: &PidSet) -> PidSet;
}

/// Delivers signals to sets of processes.
pub trait SignalSender: Send + Sync + Debug {
    /// Send `signal` to all of `pids`; `true` if delivery succeeded for all.
    fn send(&self, pids: &PidSet, signal: Signal) -> bool;
}

/// Launches processes that outlive the caller.
pub trait Spawner: Send + Sync + Debug {
    /// Start `argv` detached from the caller, with stdio on the null device.
    fn spawn_detached(&self, argv: &[String], cwd: Option<&Path>) -> Result<()>;
}

/// Bundle of OS collaborators handed to a `Control`.
#[derive(Debug, Clone)]
pub struct Backend {
    pub table: Arc<dyn ProcessTable>,
    pub signals: Arc<dyn SignalSender>,
    pub spawner: Arc<dyn Spawner>,
    pub fs: Arc<dyn FileSystem>,
}

impl Backend {
    /// Production backend: `pidof`/`ps`/`kill` and a double-fork detached spawn.
    pub fn real() -> Self {
        Self {
            table: Arc::new(PsTable::new()),
            signals: Arc::new(KillUtility::new()),
            spawner: Arc::new(DetachedSpawner::new()),
            fs: Arc::new(RealFileSystem),
        }
    }

    /// Backend where a single host object plays table, signaller and spawner.
    pub fn from_host<H>(host: H, fs: Arc<dyn FileSystem>) -> Self
    where
        H: ProcessTable + SignalSender + Spawner + Clone + 'static,
    {
        Self {
            table: Arc::new(host.clone()),
            signals: Arc::new(host.clone()),
            spawner: Arc::new(host),
            fs,
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::real()
    }
}
