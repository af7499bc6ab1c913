#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use procctl::control::{Control, ControlOptions, EscalationPolicy, ProcessSpec};
use procctl::fs::mock::MockFileSystem;
use procctl::os::mock::{MockHost, MockProgram};
use procctl::os::Backend;

/// Timings with no sleeping at all, for the in-memory host.
pub fn instant_options() -> ControlOptions {
    ControlOptions {
        poll_attempts: 3,
        poll_interval: Duration::ZERO,
        escalation: EscalationPolicy::with_wait(Duration::ZERO),
    }
}

/// Mock host plus the filesystem the resolver sees.
///
/// Clones share the same simulated OS, so several controls built from one
/// `MockWorld` observe the same processes.
#[derive(Debug, Clone)]
pub struct MockWorld {
    pub host: MockHost,
    pub fs: MockFileSystem,
}

impl Default for MockWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWorld {
    pub fn new() -> Self {
        Self {
            host: MockHost::new(),
            fs: MockFileSystem::new(),
        }
    }

    /// Register `program` and make it resolvable as `/work/bin/<name>`.
    pub fn install_local(&self, program: MockProgram) {
        self.fs.add_file(format!("/work/bin/{}", program.name));
        self.host.register(program);
    }

    /// Register `program` and put it on the mock PATH.
    pub fn install_on_path(&self, program: MockProgram) {
        self.fs.add_on_path(&program.name);
        self.host.register(program);
    }

    pub fn backend(&self) -> Backend {
        Backend::from_host(self.host.clone(), Arc::new(self.fs.clone()))
    }

    pub fn control(&self, spec: &ProcessSpec) -> Control {
        Control::with_backend(spec, self.backend(), instant_options())
            .expect("spec should resolve in mock world")
    }
}

/// Parent that forks two named children on launch.
pub fn sleep_forever() -> MockProgram {
    MockProgram::new("sleep-forever")
        .child("sleep-forever.1")
        .child("sleep-forever.2")
}

/// Parent that forks three helpers under names nobody configured.
pub fn forking_daemon() -> MockProgram {
    MockProgram::new("daemon")
        .helper("daemon-helper")
        .chained_helper("daemon-worker")
        .chained_helper("daemon-subworker")
}
