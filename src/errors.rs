// src/errors.rs

//! Error type shared by config loading, resolution and the CLI.
//!
//! Supervision itself (`start`/`stop`/`status`) never fails; only building a
//! `Control` and reading configuration do.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcctlError {
    /// A process entry or config file that cannot be used.
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A process name given on the command line is not in the config.
    #[error("no process named '{0}' in the config")]
    ProcessNotFound(String),

    #[error("malformed TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ProcctlError>;
