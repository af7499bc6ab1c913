mod common;

use std::io::Write;
use std::time::Duration;

use procctl::config::{load_and_validate, parse_and_validate, ConfigFile};
use procctl::control::EscalationPolicy;
use procctl::errors::ProcctlError;
use procctl_test_utils::builders::{ConfigFileBuilder, ProcessSpecBuilder};

use crate::common::TestResult;

#[test]
fn minimal_config_uses_default_timings() -> TestResult {
    let cfg = parse_and_validate(
        r#"
[process.web]
cmd = ["./server", "--port", "8080"]
cwd = "build"
"#,
    )?;

    assert_eq!(cfg.timings.poll_attempts, 3);
    assert_eq!(cfg.timings.poll_interval, Duration::from_millis(500));
    assert_eq!(cfg.timings.escalation_wait, Duration::from_millis(500));
    assert_eq!(cfg.timings.status_interval, Duration::from_secs(1));

    let web = &cfg.process["web"];
    assert_eq!(web.name.as_deref(), Some("web"));
    assert_eq!(web.cmd, vec!["./server", "--port", "8080"]);
    assert_eq!(web.cwd.as_deref(), Some(std::path::Path::new("build")));
    Ok(())
}

#[test]
fn command_and_children_accept_plain_strings() -> TestResult {
    let cfg = parse_and_validate(
        r#"
[process.sampler]
name = "sample_one"
cmd = "sample_one --fast"
children = "sample_one.1 sample_one.2"
stop_cmd = "stop_sampler now"
"#,
    )?;

    let spec = &cfg.process["sampler"];
    assert_eq!(spec.name.as_deref(), Some("sample_one"));
    assert_eq!(spec.cmd, vec!["sample_one", "--fast"]);
    assert_eq!(spec.children, vec!["sample_one.1", "sample_one.2"]);
    assert_eq!(
        spec.stop_cmd,
        Some(vec!["stop_sampler".to_string(), "now".to_string()])
    );
    Ok(())
}

#[test]
fn config_section_overrides_timings() -> TestResult {
    let cfg = parse_and_validate(
        r#"
[config]
poll_attempts = 10
poll_interval = "50ms"
escalation_wait = "2s"
status_interval = "1m"

[process.ls]
"#,
    )?;

    assert_eq!(cfg.timings.poll_attempts, 10);
    assert_eq!(cfg.timings.status_interval, Duration::from_secs(60));

    let options = cfg.control_options();
    assert_eq!(options.poll_attempts, 10);
    assert_eq!(options.poll_interval, Duration::from_millis(50));
    assert_eq!(options.escalation, EscalationPolicy::with_wait(Duration::from_secs(2)));
    Ok(())
}

fn config_error(toml: &str) -> String {
    match parse_and_validate(toml) {
        Err(ProcctlError::ConfigError(msg)) => msg,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn rejects_config_without_processes() {
    let msg = config_error("[config]\npoll_attempts = 2\n");
    assert!(msg.contains("at least one"), "{msg}");
}

#[test]
fn rejects_zero_poll_attempts() {
    let msg = config_error("[config]\npoll_attempts = 0\n\n[process.ls]\n");
    assert!(msg.contains("poll_attempts"), "{msg}");
}

#[test]
fn rejects_bad_durations() {
    let msg = config_error("[config]\nescalation_wait = \"5 parsecs\"\n\n[process.ls]\n");
    assert!(msg.contains("escalation_wait"), "{msg}");

    let msg = config_error("[config]\npoll_interval = \"500\"\n\n[process.ls]\n");
    assert!(msg.contains("poll_interval"), "{msg}");
}

#[test]
fn rejects_commands_without_executable() {
    let msg = config_error("[process.svc]\nstop_cmd = []\n");
    assert!(msg.contains("stop_cmd"), "{msg}");

    let msg = config_error("[process.svc]\nstart_cmd = [\"\", \"--flag\"]\n");
    assert!(msg.contains("start_cmd"), "{msg}");
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let err = parse_and_validate("[process.svc\ncmd = 1").unwrap_err();
    assert!(matches!(err, ProcctlError::TomlError(_)), "got {err:?}");
}

#[test]
fn loads_from_disk() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "[process.sleeper]\ncmd = [\"sleep\", \"30\"]\nchildren = []")?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.process.len(), 1);
    assert_eq!(cfg.process["sleeper"].cmd, vec!["sleep", "30"]);
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_and_validate("/definitely/not/here/Procctl.toml").unwrap_err();
    assert!(matches!(err, ProcctlError::IoError(_)), "got {err:?}");
}

#[test]
fn builder_configs_validate_like_files() {
    let cfg: ConfigFile = ConfigFileBuilder::new()
        .poll_attempts(5)
        .poll_interval("10ms")
        .escalation_wait("0ms")
        .with_process("svc", ProcessSpecBuilder::new().cmd(&["svc", "-v"]).build())
        .build();

    assert_eq!(cfg.process["svc"].name.as_deref(), Some("svc"));
    assert_eq!(cfg.control_options().poll_attempts, 5);

    let raw = ConfigFileBuilder::new().poll_attempts(0).raw();
    assert!(ConfigFile::try_from(raw).is_err());
}

#[test]
fn duration_strings() {
    use procctl::types::parse_duration;

    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration(" 3 s "), Ok(Duration::from_secs(3)));
    assert_eq!(parse_duration("2M"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("").is_err());
    assert!(parse_duration("ms").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("10d").is_err());
}
