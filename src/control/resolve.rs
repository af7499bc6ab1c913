// src/control/resolve.rs

//! Executable resolution.
//!
//! Mirrors shell lookup: a bare name found on PATH is kept as-is (the OS
//! searches PATH again at spawn time); anything else is looked up relative to
//! the working directory and rewritten to an unambiguous `./` form.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::control::spec::{ProcessConfig, ProcessSpec};
use crate::errors::{ProcctlError, Result};
use crate::fs::FileSystem;

/// Keep `cwd` only if it names an existing directory.
pub fn validate_cwd(fs: &dyn FileSystem, cwd: Option<&Path>) -> Option<PathBuf> {
    let cwd = cwd?;
    if !fs.exists(cwd) {
        warn!(cwd = %cwd.display(), "no such directory; ignoring cwd");
        return None;
    }
    if !fs.is_dir(cwd) {
        warn!(cwd = %cwd.display(), "not a directory; ignoring cwd");
        return None;
    }
    Some(cwd.to_path_buf())
}

/// Resolve an executable reference to something spawnable.
///
/// Returns `None` when the executable can be found neither on PATH nor under
/// `cwd` (or the current directory when `cwd` is `None`).
pub fn resolve_executable(fs: &dyn FileSystem, name: &str, cwd: Option<&Path>) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    // Names containing a slash are never searched on PATH.
    if !name.contains('/') && fs.find_on_path(name).is_some() {
        return Some(name.to_string());
    }

    let base = match cwd {
        Some(dir) => dir.to_path_buf(),
        None => fs.current_dir().ok()?,
    };
    let base = fs.canonicalize(&base).unwrap_or(base);
    let target = fs.canonicalize(&base.join(name)).ok()?;
    if !fs.is_file(&target) {
        return None;
    }

    match target.strip_prefix(&base) {
        Ok(rel) => Some(format!("./{}", rel.display())),
        Err(_) => Some(target.display().to_string()),
    }
}

/// Apply defaults and resolve the executable of a specification.
///
/// The executable reference comes from the first non-empty of `start_cmd[0]`,
/// `cmd[0]`, `ex_name`, `name`. Fails only when none of them is present; an
/// executable that cannot be located yields an unresolved config instead.
pub fn resolve_spec(spec: &ProcessSpec, fs: &dyn FileSystem) -> Result<ProcessConfig> {
    let cwd = validate_cwd(fs, spec.cwd.as_deref());

    // A command whose first token is blank names nothing and counts as absent.
    let start_tokens = [spec.start_cmd.as_deref(), Some(spec.cmd.as_slice())]
        .into_iter()
        .flatten()
        .find(|tokens| non_empty(tokens.first().map(String::as_str)).is_some());

    let (reference, args) = match start_tokens {
        Some(tokens) => (tokens[0].trim().to_string(), tokens[1..].to_vec()),
        None => {
            let reference = non_empty(spec.ex_name.as_deref())
                .or_else(|| non_empty(spec.name.as_deref()))
                .ok_or_else(|| {
                    ProcctlError::ConfigError(
                        "unable to determine what to execute: set one of `name`, `cmd` or `ex_name`"
                            .to_string(),
                    )
                })?;
            (reference.to_string(), Vec::new())
        }
    };

    let (ex_name, resolved) = match resolve_executable(fs, &reference, cwd.as_deref()) {
        Some(ex) => (ex, true),
        None => {
            warn!(
                executable = %reference,
                cwd = ?cwd,
                "unable to locate executable; process will be treated as stopped"
            );
            (reference.clone(), false)
        }
    };

    let ps_name = non_empty(spec.ps_name.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| basename(&ex_name));
    let name = non_empty(spec.name.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| ps_name.clone());

    let stop_cmd = spec
        .stop_cmd
        .as_ref()
        .filter(|c| !c.is_empty())
        .and_then(|tokens| resolve_stop_cmd(fs, tokens, cwd.as_deref(), &name));

    Ok(ProcessConfig {
        name,
        ex_name,
        args,
        ps_name,
        children: unique(&spec.children),
        cwd,
        stop_cmd,
        resolved,
    })
}

fn resolve_stop_cmd(
    fs: &dyn FileSystem,
    tokens: &[String],
    cwd: Option<&Path>,
    process: &str,
) -> Option<Vec<String>> {
    match resolve_executable(fs, &tokens[0], cwd) {
        Some(ex) => {
            let mut argv = tokens.to_vec();
            argv[0] = ex;
            Some(argv)
        }
        None => {
            warn!(
                process = %process,
                executable = %tokens[0],
                "unable to locate stop command; falling back to signals"
            );
            None
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn unique(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}
