use proptest::prelude::*;
use procctl::Status;
use procctl_test_utils::builders::ProcessSpecBuilder;
use procctl_test_utils::fixtures::MockWorld;

const CHILD_NAMES: [&str; 4] = ["svc.a", "svc.b", "svc.c", "svc.d"];

#[test]
fn status_table_for_a_process_with_two_children() {
    let world = MockWorld::new();
    world.fs.add_on_path("svc");
    let control = world.control(
        &ProcessSpecBuilder::new()
            .name("svc")
            .child("svc.a")
            .child("svc.b")
            .build(),
    );

    assert_eq!(control.status(), Status::Stopped);

    let a = world.host.add_process("svc.a", 1);
    assert_eq!(control.status(), Status::Jeopardy);

    world.host.add_process("svc", 1);
    assert_eq!(control.status(), Status::Jeopardy);

    let b = world.host.add_process("svc.b", 1);
    assert_eq!(control.status(), Status::Running);

    // Two instances of one child do not stand in for the missing other.
    world.host.kill_external(b);
    world.host.add_process("svc.a", 1);
    assert_eq!(control.status(), Status::Jeopardy);

    world.host.kill_external(a);
    assert_eq!(control.status(), Status::Jeopardy);
}

#[test]
fn primary_alone_is_running_without_children() {
    let world = MockWorld::new();
    world.fs.add_on_path("svc");
    let control = world.control(&ProcessSpecBuilder::new().name("svc").build());

    world.host.add_process("svc", 1);
    assert_eq!(control.status(), Status::Running);
    assert!(control.is_running());
}

#[test]
fn status_display_and_parse() {
    assert_eq!(Status::Stopped.to_string(), "STOPPED");
    assert_eq!(Status::Jeopardy.to_string(), "JEOPARDY");
    assert_eq!(Status::Running.to_string(), "RUNNING");
    assert_eq!("running".parse::<Status>(), Ok(Status::Running));
    assert_eq!(" Jeopardy ".parse::<Status>(), Ok(Status::Jeopardy));
    assert!("paused".parse::<Status>().is_err());
    assert_eq!(Status::Stopped as i32, -1);
    assert_eq!(Status::Running as i32, 1);
}

fn expected(primary: bool, present: &[bool]) -> Status {
    let found = present.iter().filter(|p| **p).count();
    if !primary && found == 0 {
        Status::Stopped
    } else if primary && found == present.len() {
        Status::Running
    } else {
        Status::Jeopardy
    }
}

proptest! {
    #[test]
    fn status_follows_the_presence_table(
        primary in any::<bool>(),
        present in proptest::collection::vec(any::<bool>(), 0..=CHILD_NAMES.len()),
        extra_copies in 0usize..3,
    ) {
        let world = MockWorld::new();
        world.fs.add_on_path("svc");
        let mut spec = ProcessSpecBuilder::new().name("svc");
        for name in &CHILD_NAMES[..present.len()] {
            spec = spec.child(name);
        }
        let control = world.control(&spec.build());

        if primary {
            world.host.add_process("svc", 1);
        }
        for (name, up) in CHILD_NAMES.iter().zip(&present) {
            if *up {
                for _ in 0..=extra_copies {
                    world.host.add_process(name, 1);
                }
            }
        }

        prop_assert_eq!(control.status(), expected(primary, &present));
        prop_assert_eq!(control.is_running(), expected(primary, &present) != Status::Stopped);
    }

    #[test]
    fn from_presence_never_reports_running_with_missing_children(
        primary in any::<bool>(),
        expected_children in 0usize..8,
        missing in 1usize..8,
    ) {
        let found = expected_children.saturating_sub(missing);
        if found < expected_children {
            prop_assert_ne!(
                Status::from_presence(primary, found, expected_children),
                Status::Running
            );
        }
    }
}
