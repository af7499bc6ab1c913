// src/lib.rs

pub mod cli;
pub mod config;
pub mod control;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod os;
pub mod types;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{default_config_path, load_and_validate, ConfigFile};
use crate::errors::ProcctlError;
use crate::os::Backend;
use crate::types::parse_duration;

pub use crate::control::{Control, ControlOptions, ProcessSpec};
pub use crate::types::Status;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - one `Control` per selected process
/// - the requested command
/// - Ctrl-C handling for `watch`
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args
        .config
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config {:?}", config_path))?;
    let root = config_root_dir(&config_path);

    match args.command {
        Command::Status { names } => {
            for control in select_controls(&cfg, &root, &names)? {
                let line = blocking(control, |c| status_line(&c, c.status())).await?;
                println!("{line}");
            }
        }
        Command::Start { names } => {
            for control in select_controls(&cfg, &root, &names)? {
                let line = blocking(control, |c| status_line(&c, c.start())).await?;
                println!("{line}");
            }
        }
        Command::Stop { names } => {
            for control in select_controls(&cfg, &root, &names)? {
                let line = blocking(control, |c| status_line(&c, c.stop())).await?;
                println!("{line}");
            }
        }
        Command::Restart { names } => {
            for control in select_controls(&cfg, &root, &names)? {
                let line = blocking(control, |c| status_line(&c, c.restart())).await?;
                println!("{line}");
            }
        }
        Command::Show { names } => {
            print_dry_run(&cfg, &select_controls(&cfg, &root, &names)?);
        }
        Command::Watch { interval, names } => {
            let period = match interval {
                Some(s) => parse_duration(&s).map_err(ProcctlError::ConfigError)?,
                None => cfg.timings.status_interval,
            };
            watch(select_controls(&cfg, &root, &names)?, period).await?;
        }
    }

    Ok(())
}

/// Figure out the directory relative `cwd` entries are anchored to.
///
/// - If the config path has a non-empty parent (e.g. "deploy/Procctl.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Procctl.toml" (parent = ""),
///   we fall back to the current working directory "."
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Build controls for the named processes, in the order given. An empty
/// `names` selects every process, sorted by name.
pub fn select_controls(cfg: &ConfigFile, root: &Path, names: &[String]) -> Result<Vec<Control>> {
    let selected: Vec<(&String, &ProcessSpec)> = if names.is_empty() {
        cfg.process.iter().collect()
    } else {
        names
            .iter()
            .map(|name| {
                cfg.process
                    .get_key_value(name)
                    .ok_or_else(|| ProcctlError::ProcessNotFound(name.clone()))
            })
            .collect::<std::result::Result<_, _>>()?
    };

    let options = cfg.control_options();
    selected
        .into_iter()
        .map(|(key, spec)| {
            let spec = anchor_cwd(spec, root);
            Control::with_backend(&spec, Backend::real(), options.clone())
                .with_context(|| format!("configuring process '{key}'"))
        })
        .collect()
}

/// Relative `cwd` values are taken relative to the config file's directory.
fn anchor_cwd(spec: &ProcessSpec, root: &Path) -> ProcessSpec {
    let mut spec = spec.clone();
    spec.cwd = spec
        .cwd
        .take()
        .map(|cwd| if cwd.is_relative() { root.join(cwd) } else { cwd });
    spec
}

/// Run a blocking `Control` operation off the async executor.
async fn blocking<T, F>(control: Control, f: F) -> Result<T>
where
    F: FnOnce(Control) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(control))
        .await
        .context("control task panicked")
}

fn status_line(control: &Control, status: Status) -> String {
    let pids: Vec<String> = control.pids().iter().map(|p| p.to_string()).collect();
    format!("{:<24} {:<9} {}", control.name(), status, pids.join(" "))
}

/// Reprint the status of every control each `period` until Ctrl-C.
async fn watch(controls: Vec<Control>, period: Duration) -> Result<()> {
    info!(processes = controls.len(), ?period, "watching process status (Ctrl-C to exit)");
    let mut ticker = tokio::time::interval(period);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for control in controls.iter().cloned() {
                    let line = blocking(control, |c| status_line(&c, c.status())).await?;
                    println!("{line}");
                }
                println!();
            }
            res = &mut ctrl_c => {
                res.context("listening for Ctrl-C")?;
                info!("shutdown requested; leaving supervised processes as they are");
                break;
            }
        }
    }

    Ok(())
}

/// Simple dry-run output: print each process as it was resolved.
fn print_dry_run(cfg: &ConfigFile, controls: &[Control]) {
    println!("procctl dry-run");
    println!("  config.poll_attempts = {}", cfg.timings.poll_attempts);
    println!("  config.poll_interval = {:?}", cfg.timings.poll_interval);
    println!("  config.escalation_wait = {:?}", cfg.timings.escalation_wait);
    println!("  config.status_interval = {:?}", cfg.timings.status_interval);
    println!();

    println!("processes ({}):", controls.len());
    for control in controls {
        println!("  - {}", control.name());
        println!("      cmd: {:?}", control.command_line());
        println!("      ps_name: {}", control.ps_name());
        if !control.is_resolved() {
            println!("      resolved: false (executable not found)");
        }
        if let Some(cwd) = control.cwd() {
            println!("      cwd: {}", cwd.display());
        }
        if !control.children().is_empty() {
            println!("      children: {:?}", control.children());
        }
        if let Some(stop) = control.stop_cmd() {
            println!("      stop_cmd: {:?}", stop);
        }
    }

    debug!("dry-run complete (no execution)");
}
