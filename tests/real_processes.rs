//! Runs against the live process table. Each test returns early when the
//! utilities it needs are not installed.

mod common;

use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use procctl::control::{Control, ControlOptions, EscalationPolicy};
use procctl::os::{
    Backend, DetachedSpawner, KillUtility, ProcessTable, PsTable, Signal, SignalSender, Spawner,
};
use procctl::Status;
use procctl_test_utils::builders::ProcessSpecBuilder;

use crate::common::{init_tracing, TestResult};

fn have(tool: &str) -> bool {
    which::which(tool).is_ok()
}

/// Copy `sleep` into `dir` under a name no other test uses, so the process
/// table lookup only sees what the test started. `None` when that is not
/// possible here.
fn private_sleep(dir: &Path, prefix: &str) -> std::io::Result<Option<String>> {
    let Ok(sleep) = which::which("sleep") else {
        eprintln!("skipping: sleep not available");
        return Ok(None);
    };
    let name = format!("{prefix}{}", std::process::id() % 100_000);
    let exe = dir.join(&name);
    std::fs::copy(&sleep, &exe)?;
    if !Command::new(&exe).arg("0").status()?.success() {
        eprintln!("skipping: copied sleep binary does not run under a new name");
        return Ok(None);
    }
    Ok(Some(name))
}

/// Poll until no live (non-zombie) process is called `name`.
fn wait_until_gone(table: &PsTable, name: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        let pids = table.lookup(&[name.to_string()]);
        if table.defunct(&pids) == pids {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

fn patient_options() -> ControlOptions {
    ControlOptions {
        poll_attempts: 20,
        poll_interval: Duration::from_millis(100),
        escalation: EscalationPolicy::with_wait(Duration::from_millis(200)),
    }
}

#[test]
fn absent_process_is_stopped_and_cannot_start() -> TestResult {
    init_tracing();
    let control = Control::new(&ProcessSpecBuilder::new().name("procctl-absent-process").build())?;

    assert!(!control.is_resolved());
    assert_eq!(control.status(), Status::Stopped);
    assert_eq!(control.start(), Status::Stopped);
    assert_eq!(control.stop(), Status::Stopped);
    Ok(())
}

#[test]
fn start_and_stop_a_real_sleeper() -> TestResult {
    init_tracing();
    if !(have("pidof") && have("ps") && have("kill")) {
        eprintln!("skipping: pidof/ps/kill not available");
        return Ok(());
    }
    let dir = tempfile::tempdir()?;
    let Some(name) = private_sleep(dir.path(), "pcsleep")? else {
        return Ok(());
    };

    let spec = ProcessSpecBuilder::new()
        .cmd(&[name.as_str(), "30"])
        .cwd(dir.path())
        .build();
    let control = Control::with_backend(&spec, Backend::real(), patient_options())?;
    assert_eq!(control.ex_name(), format!("./{name}"));

    assert_eq!(control.start(), Status::Running);
    assert_eq!(control.start(), Status::Running);
    assert_eq!(PsTable::new().lookup(&[name.clone()]).len(), 1);

    assert_eq!(control.stop(), Status::Stopped);
    let table = PsTable::new();
    let left = table.lookup(&[name]);
    assert_eq!(table.defunct(&left), left, "only unreaped zombies may remain");
    Ok(())
}

#[test]
fn spawned_programs_can_be_interrupted() -> TestResult {
    init_tracing();
    if !(have("pidof") && have("ps") && have("kill")) {
        eprintln!("skipping: pidof/ps/kill not available");
        return Ok(());
    }
    let dir = tempfile::tempdir()?;
    let Some(name) = private_sleep(dir.path(), "pcint")? else {
        return Ok(());
    };

    let argv = vec![format!("./{name}"), "60".to_string()];
    DetachedSpawner::new().spawn_detached(&argv, Some(dir.path()))?;

    let table = PsTable::new();
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut pids = table.lookup(&[name.clone()]);
    while pids.is_empty() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
        pids = table.lookup(&[name.clone()]);
    }
    assert_eq!(pids.len(), 1, "spawned program not found in the process table");

    assert!(KillUtility::new().send(&pids, Signal::Int));
    let gone = wait_until_gone(&table, &name, Duration::from_secs(2));
    if !gone {
        KillUtility::new().send(&pids, Signal::Kill);
    }
    assert!(gone, "SIGINT did not end the spawned program");
    Ok(())
}

#[test]
fn missing_program_is_a_spawn_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let argv = vec!["./procctl-no-such-program".to_string()];
    assert!(DetachedSpawner::new().spawn_detached(&argv, Some(dir.path())).is_err());
    assert!(DetachedSpawner::new().spawn_detached(&[], None).is_err());
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn a_start_logs_one_info_line() -> TestResult {
    if !have("true") {
        eprintln!("skipping: true not available");
        return Ok(());
    }
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let spec = ProcessSpecBuilder::new().cmd(&["true"]).build();
    let options = ControlOptions {
        poll_attempts: 1,
        poll_interval: Duration::ZERO,
        escalation: EscalationPolicy::with_wait(Duration::ZERO),
    };
    tracing::subscriber::with_default(subscriber, || -> TestResult {
        let control = Control::with_backend(&spec, Backend::real(), options)?;
        control.start();
        Ok(())
    })?;

    let text = String::from_utf8(logs.0.lock().unwrap().clone())?;
    let info_lines = text.lines().filter(|l| l.contains(" INFO ")).count();
    assert_eq!(info_lines, 1, "{text}");
    assert!(text.contains("starting process"), "{text}");
    Ok(())
}
