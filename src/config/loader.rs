// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "PROCCTL_CONFIG";

/// File looked up in the current directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "Procctl.toml";

/// Read and deserialize a config file without semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading config");
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

/// Read a config file and validate it (see `validate.rs`): at least one
/// process, usable timings, commands that start with an executable.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    ConfigFile::try_from(load_from_path(path)?)
}

/// [`load_and_validate`] for TOML already in memory.
pub fn parse_and_validate(text: &str) -> Result<ConfigFile> {
    let raw: RawConfigFile = toml::from_str(text)?;
    ConfigFile::try_from(raw)
}

/// `$PROCCTL_CONFIG` if set, else `Procctl.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
