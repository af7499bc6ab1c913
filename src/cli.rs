// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `procctl`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procctl",
    version,
    about = "Start, stop and monitor process trees described in a config file.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `$PROCCTL_CONFIG`, else `Procctl.toml` in the current
    /// working directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCCTL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do. Every command takes optional process names; none means all
/// processes in the config.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the status and PIDs of each process.
    Status { names: Vec<String> },
    /// Start processes that are not running.
    Start { names: Vec<String> },
    /// Stop processes together with their children.
    Stop { names: Vec<String> },
    /// Stop, then start again.
    Restart { names: Vec<String> },
    /// Print the resolved configuration without touching any process.
    Show { names: Vec<String> },
    /// Reprint status periodically until Ctrl-C.
    Watch {
        /// Refresh period, e.g. `500ms` or `2s`. Defaults to
        /// `[config].status_interval`.
        #[arg(long, value_name = "DURATION")]
        interval: Option<String>,
        names: Vec<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
