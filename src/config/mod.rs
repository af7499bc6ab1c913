// src/config/mod.rs

//! `Procctl.toml`: a `[config]` table of timings plus one
//! `[process.<name>]` table per supervised process.
//!
//! `model` holds the serde types, `loader` reads files, and `validate`
//! turns a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, parse_and_validate};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, Timings};
