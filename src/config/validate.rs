// src/config/validate.rs

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::model::{ConfigFile, ConfigSection, RawConfigFile, Timings};
use crate::control::ProcessSpec;
use crate::errors::{ProcctlError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ProcctlError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_processes(&raw)?;
        let timings = validate_timings(&raw.config)?;
        let process = validate_processes(raw.process)?;
        Ok(ConfigFile::new_unchecked(timings, process))
    }
}

fn ensure_has_processes(cfg: &RawConfigFile) -> Result<()> {
    if cfg.process.is_empty() {
        return Err(ProcctlError::ConfigError(
            "config must contain at least one [process.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_timings(section: &ConfigSection) -> Result<Timings> {
    if section.poll_attempts == 0 {
        return Err(ProcctlError::ConfigError(
            "[config].poll_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(Timings {
        poll_attempts: section.poll_attempts,
        poll_interval: duration_field("poll_interval", &section.poll_interval)?,
        escalation_wait: duration_field("escalation_wait", &section.escalation_wait)?,
        status_interval: duration_field("status_interval", &section.status_interval)?,
    })
}

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| ProcctlError::ConfigError(format!("[config].{field}: {e}")))
}

fn validate_processes(
    processes: BTreeMap<String, ProcessSpec>,
) -> Result<BTreeMap<String, ProcessSpec>> {
    let mut out = BTreeMap::new();

    for (key, mut spec) in processes {
        if key.trim().is_empty() {
            return Err(ProcctlError::ConfigError(
                "process names must not be empty".to_string(),
            ));
        }

        check_command(&key, "cmd", Some(&spec.cmd).filter(|c| !c.is_empty()))?;
        check_command(&key, "start_cmd", spec.start_cmd.as_ref())?;
        check_command(&key, "stop_cmd", spec.stop_cmd.as_ref())?;

        if spec.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            spec.name = Some(key.clone());
        }

        out.insert(key, spec);
    }

    Ok(out)
}

fn check_command(process: &str, field: &str, tokens: Option<&Vec<String>>) -> Result<()> {
    match tokens {
        Some(tokens) if tokens.first().is_none_or(|t| t.trim().is_empty()) => {
            Err(ProcctlError::ConfigError(format!(
                "process '{process}': `{field}` must start with an executable"
            )))
        }
        _ => Ok(()),
    }
}
