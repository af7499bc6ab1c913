mod common;

use std::time::Duration;

use procctl::control::{EscalationPolicy, EscalationStep, Escalator};
use procctl::os::mock::{MockHost, MockProgram};
use procctl::os::{KillUtility, PidSet, Signal, SignalSender};

use crate::common::init_tracing;

fn instant(signals: &[Signal]) -> EscalationPolicy {
    EscalationPolicy::new(
        signals
            .iter()
            .map(|signal| EscalationStep {
                signal: *signal,
                wait: Duration::ZERO,
            })
            .collect(),
    )
}

#[test]
fn default_policy_is_term_term_kill() {
    let policy = EscalationPolicy::default();
    let signals: Vec<Signal> = policy.steps.iter().map(|s| s.signal).collect();
    assert_eq!(signals, vec![Signal::Term, Signal::Term, Signal::Kill]);
    assert!(policy.steps.iter().all(|s| s.wait == Duration::from_millis(500)));
}

#[test]
fn any_alive_probes_each_pid() {
    let host = MockHost::new();
    let escalator = Escalator::new(&host, &host);
    let live = host.add_process("live", 1);
    let gone = host.add_process("gone", 1);
    host.kill_external(gone);

    assert!(!escalator.any_alive(&PidSet::new()));
    assert!(!escalator.any_alive(&PidSet::from([gone])));
    assert!(escalator.any_alive(&PidSet::from([gone, live])));
}

#[test]
fn zombies_do_not_count_as_alive() {
    let host = MockHost::new();
    let escalator = Escalator::new(&host, &host);
    let zombie = host.add_process("zombie", 1);
    host.make_defunct(zombie);

    assert!(!escalator.any_alive(&PidSet::from([zombie])));
    assert!(!escalator.escalate(&PidSet::from([zombie]), &instant(&[Signal::Term, Signal::Kill])));
    assert!(host.deliveries().is_empty());
}

#[test]
fn escalation_stops_once_targets_are_gone() {
    init_tracing();
    let host = MockHost::new();
    host.register(MockProgram::new("stubborn").term_resistance(1));
    procctl::os::Spawner::spawn_detached(&host, &["stubborn".to_string()], None)
        .expect("mock spawn");
    let pids = host.pids_named("stubborn");
    let escalator = Escalator::new(&host, &host);

    let survivors = escalator.escalate(&pids, &EscalationPolicy::with_wait(Duration::ZERO));

    assert!(!survivors);
    let signals: Vec<Signal> = host.deliveries().into_iter().map(|(_, s)| s).collect();
    assert_eq!(signals, vec![Signal::Term, Signal::Term]);
}

#[test]
fn escalation_reports_survivors() {
    init_tracing();
    let host = MockHost::new();
    host.register(MockProgram::new("immortal").term_resistance(u32::MAX));
    procctl::os::Spawner::spawn_detached(&host, &["immortal".to_string()], None)
        .expect("mock spawn");
    let pids = host.pids_named("immortal");
    let escalator = Escalator::new(&host, &host);

    assert!(escalator.escalate(&pids, &instant(&[Signal::Term, Signal::Int, Signal::Hup])));
    assert_eq!(host.pids_named("immortal"), pids);
}

#[test]
fn deliver_skips_empty_sets() {
    let host = MockHost::new();
    let escalator = Escalator::new(&host, &host);

    assert!(!escalator.deliver(&PidSet::new(), Signal::Kill));
    assert!(host.events().is_empty());
}

#[test]
fn signal_names() {
    assert_eq!(Signal::Term.as_arg(), "-TERM");
    assert_eq!(Signal::Kill.as_arg(), "-KILL");
    assert_eq!(Signal::Probe.as_arg(), "-0");
    assert_eq!(Signal::Term.to_string(), "SIGTERM");
    assert_eq!(Signal::Probe.to_string(), "0");
}

#[test]
fn kill_utility_never_signals_an_empty_set() {
    assert!(!KillUtility::new().send(&PidSet::new(), Signal::Kill));
}
