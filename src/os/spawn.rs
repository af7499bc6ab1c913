// src/os/spawn.rs

//! Detached process launch.
//!
//! The child forked by `Command::spawn` is only an intermediate: inside
//! `pre_exec` it starts a new session, forks once more and exits. The
//! grandchild carries on into `exec`, so the long-lived program is reparented
//! by the OS and never needs reaping by us. We only wait for the intermediate,
//! which is gone immediately. Exec failures in the grandchild still surface as
//! a spawn error, since it holds the close-on-exec status pipe `spawn` reads.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use tracing::debug;

use super::Spawner;

#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedSpawner;

impl DetachedSpawner {
    pub fn new() -> Self {
        Self
    }

    fn command(argv: &[String], cwd: Option<&Path>) -> Result<Command> {
        let mut cmd = Command::new(program_path(&argv[0], cwd)?);
        cmd.args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(&argv[0]);
        }

        Ok(cmd)
    }
}

/// Relative paths such as `./server` are meant relative to `cwd`; make them
/// absolute so the lookup does not depend on when the child changes
/// directory. Bare names are left for the PATH search.
fn program_path(program: &str, cwd: Option<&Path>) -> Result<PathBuf> {
    let path = Path::new(program);
    if path.is_absolute() || !program.contains('/') {
        return Ok(path.to_path_buf());
    }
    let base = std::env::current_dir().context("reading current directory")?;
    Ok(match cwd {
        Some(dir) => base.join(dir).join(path),
        None => base.join(path),
    })
}

impl Spawner for DetachedSpawner {
    /// # Safety
    ///
    /// On Unix the `pre_exec` hook runs between fork and exec and only calls
    /// async-signal-safe functions: `setsid`, `sigaction` (via `signal`),
    /// `fork` and `_exit`. It neither allocates nor locks.
    #[allow(unsafe_code)] // SAFETY: Unix pre_exec session detachment + second fork
    fn spawn_detached(&self, argv: &[String], cwd: Option<&Path>) -> Result<()> {
        if argv.is_empty() {
            bail!("empty command line");
        }

        let mut cmd = Self::command(argv, cwd)?;

        #[cfg(unix)]
        {
            use nix::sys::signal::{signal, SigHandler, Signal as NixSignal};
            use nix::unistd::{fork, setsid, ForkResult};
            use std::os::unix::process::CommandExt;

            unsafe {
                cmd.pre_exec(|| {
                    setsid().map_err(std::io::Error::from)?;
                    // Dispositions set to "ignore" survive exec; start from
                    // the defaults so SIGINT/SIGQUIT work on the program.
                    for sig in [NixSignal::SIGINT, NixSignal::SIGQUIT] {
                        signal(sig, SigHandler::SigDfl).map_err(std::io::Error::from)?;
                    }
                    match fork().map_err(std::io::Error::from)? {
                        ForkResult::Parent { .. } => nix::libc::_exit(0),
                        ForkResult::Child => Ok(()),
                    }
                });
            }
        }

        let mut intermediate = cmd
            .spawn()
            .with_context(|| format!("spawning {:?}", argv))?;
        let intermediate_pid = intermediate.id();

        let status = intermediate
            .wait()
            .with_context(|| format!("waiting for launcher of {:?}", argv))?;
        if !status.success() {
            bail!("launcher for {:?} exited with {}", argv, status);
        }

        debug!(intermediate_pid, cmd = ?argv, cwd = ?cwd, "spawned detached process");
        Ok(())
    }
}
