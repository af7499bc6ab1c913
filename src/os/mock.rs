// src/os/mock.rs

use super::{Pid, PidSet, ProcessTable, Signal, SignalSender, Spawner};
use anyhow::{bail, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Description of a program the mock host knows how to "run".
///
/// Spawning a command whose executable basename matches `name` creates the
/// primary process plus everything it forks.
#[derive(Debug, Clone, Default)]
pub struct MockProgram {
    pub name: String,
    /// Named children forked by the primary on launch.
    pub children: Vec<String>,
    /// Unnamed helpers forked directly by the primary.
    pub helpers: Vec<String>,
    /// Unnamed helpers forked as a chain: primary -> h1 -> h2 -> ...
    pub helper_chain: Vec<String>,
    /// How many SIGTERMs each spawned process ignores before exiting.
    pub term_resistance: u32,
    /// Process-table names this program terminates when run (stop scripts).
    /// A program with targets exits immediately instead of staying resident.
    pub stop_targets: Vec<String>,
}

impl MockProgram {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn child(mut self, name: &str) -> Self {
        self.children.push(name.to_string());
        self
    }

    pub fn helper(mut self, name: &str) -> Self {
        self.helpers.push(name.to_string());
        self
    }

    pub fn chained_helper(mut self, name: &str) -> Self {
        self.helper_chain.push(name.to_string());
        self
    }

    pub fn term_resistance(mut self, count: u32) -> Self {
        self.term_resistance = count;
        self
    }

    pub fn stops(mut self, target: &str) -> Self {
        self.stop_targets.push(target.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct MockProcess {
    pub name: String,
    pub ppid: Pid,
    pub defunct: bool,
    pub term_resistance: u32,
}

/// Something the host observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Spawned { argv: Vec<String> },
    Signalled { pids: Vec<Pid>, signal: Signal },
}

#[derive(Debug)]
struct HostState {
    next_pid: Pid,
    procs: BTreeMap<Pid, MockProcess>,
    programs: HashMap<String, MockProgram>,
    events: Vec<HostEvent>,
    fail_spawns: bool,
}

impl Default for HostState {
    fn default() -> Self {
        Self {
            next_pid: 1000,
            procs: BTreeMap::new(),
            programs: HashMap::new(),
            events: Vec::new(),
            fail_spawns: false,
        }
    }
}

/// In-memory process host: process table, signal delivery and spawner in one.
///
/// Clones share state, so a test can keep a handle while a `Control` owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    state: Arc<Mutex<HostState>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, program: MockProgram) {
        let mut state = self.state.lock().unwrap();
        state.programs.insert(program.name.clone(), program);
    }

    /// Make every subsequent spawn fail as if the program could not be launched.
    pub fn fail_spawns(&self, fail: bool) {
        self.state.lock().unwrap().fail_spawns = fail;
    }

    /// Add a process that was started outside the supervisor.
    pub fn add_process(&self, name: &str, ppid: Pid) -> Pid {
        let mut state = self.state.lock().unwrap();
        Self::insert(&mut state, name, ppid, 0)
    }

    /// Simulate an external `kill -9`.
    pub fn kill_external(&self, pid: Pid) {
        let mut state = self.state.lock().unwrap();
        Self::remove(&mut state, pid);
    }

    /// Turn a process into a zombie entry.
    pub fn make_defunct(&self, pid: Pid) {
        let mut state = self.state.lock().unwrap();
        if let Some(p) = state.procs.get_mut(&pid) {
            p.defunct = true;
        }
    }

    pub fn pids_named(&self, name: &str) -> PidSet {
        let state = self.state.lock().unwrap();
        state
            .procs
            .iter()
            .filter(|(_, p)| p.name == name && !p.defunct)
            .map(|(pid, _)| *pid)
            .collect()
    }

    pub fn process(&self, pid: Pid) -> Option<MockProcess> {
        self.state.lock().unwrap().procs.get(&pid).cloned()
    }

    /// Number of live (non-defunct) processes.
    pub fn live_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.procs.values().filter(|p| !p.defunct).count()
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, HostEvent::Spawned { .. }))
            .count()
    }

    /// Deliveries of real signals, ignoring liveness probes.
    pub fn deliveries(&self) -> Vec<(Vec<Pid>, Signal)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Signalled { pids, signal } if signal != Signal::Probe => {
                    Some((pids, signal))
                }
                _ => None,
            })
            .collect()
    }

    fn insert(state: &mut HostState, name: &str, ppid: Pid, term_resistance: u32) -> Pid {
        let pid = state.next_pid;
        state.next_pid += 1;
        state.procs.insert(
            pid,
            MockProcess {
                name: name.to_string(),
                ppid,
                defunct: false,
                term_resistance,
            },
        );
        pid
    }

    /// Remove a process and hand its children to init, like the kernel does.
    fn remove(state: &mut HostState, pid: Pid) {
        if state.procs.remove(&pid).is_some() {
            for p in state.procs.values_mut() {
                if p.ppid == pid {
                    p.ppid = 1;
                }
            }
        }
    }

    fn launch(state: &mut HostState, program: &MockProgram) {
        if !program.stop_targets.is_empty() {
            let doomed: Vec<Pid> = state
                .procs
                .iter()
                .filter(|(_, p)| program.stop_targets.contains(&p.name))
                .map(|(pid, _)| *pid)
                .collect();
            for pid in doomed {
                Self::remove(state, pid);
            }
            return;
        }

        let resistance = program.term_resistance;
        let primary = Self::insert(state, &program.name, 1, resistance);
        for child in &program.children {
            Self::insert(state, child, primary, resistance);
        }
        for helper in &program.helpers {
            Self::insert(state, helper, primary, resistance);
        }
        let mut parent = primary;
        for helper in &program.helper_chain {
            parent = Self::insert(state, helper, parent, resistance);
        }
    }
}

impl ProcessTable for MockHost {
    fn lookup(&self, names: &[String]) -> PidSet {
        let state = self.state.lock().unwrap();
        state
            .procs
            .iter()
            .filter(|(_, p)| !p.defunct && names.contains(&p.name))
            .map(|(pid, _)| *pid)
            .collect()
    }

    fn children_of(&self, parents: &PidSet) -> PidSet {
        let state = self.state.lock().unwrap();
        state
            .procs
            .iter()
            .filter(|(_, p)| parents.contains(&p.ppid))
            .map(|(pid, _)| *pid)
            .collect()
    }

    fn defunct(&self, pids: &PidSet) -> PidSet {
        let state = self.state.lock().unwrap();
        pids.iter()
            .copied()
            .filter(|pid| state.procs.get(pid).is_some_and(|p| p.defunct))
            .collect()
    }
}

impl SignalSender for MockHost {
    fn send(&self, pids: &PidSet, signal: Signal) -> bool {
        if pids.is_empty() {
            return false;
        }
        let mut state = self.state.lock().unwrap();
        state.events.push(HostEvent::Signalled {
            pids: pids.iter().copied().collect(),
            signal,
        });

        let mut all_delivered = true;
        for pid in pids {
            let exits = match state.procs.get_mut(pid) {
                None => {
                    all_delivered = false;
                    continue;
                }
                // Zombies accept signals but have nothing left to terminate.
                Some(p) if p.defunct => false,
                Some(p) => match signal {
                    Signal::Probe => false,
                    Signal::Kill => true,
                    Signal::Term | Signal::Int | Signal::Hup => {
                        if p.term_resistance > 0 {
                            p.term_resistance -= 1;
                            false
                        } else {
                            true
                        }
                    }
                },
            };
            if exits {
                Self::remove(&mut state, *pid);
            }
        }
        all_delivered
    }
}

impl Spawner for MockHost {
    fn spawn_detached(&self, argv: &[String], _cwd: Option<&Path>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_spawns {
            bail!("mock spawn failure for {:?}", argv);
        }
        let Some(exe) = argv.first() else {
            bail!("empty command line");
        };
        state.events.push(HostEvent::Spawned {
            argv: argv.to_vec(),
        });

        let base = Path::new(exe)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| exe.clone());
        if let Some(program) = state.programs.get(&base).cloned() {
            Self::launch(&mut state, &program);
        }
        Ok(())
    }
}
