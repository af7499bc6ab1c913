// src/control/spec.rs

//! Input and resolved forms of a process specification.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

/// A process specification exactly as supplied by configuration.
///
/// Every field is optional; [`super::resolve::resolve_spec`] applies the
/// defaults and turns this into a [`ProcessConfig`].
///
/// ```toml
/// [process.worker]
/// cmd = ["./worker", "--threads", "4"]
/// cwd = "build"
/// children = ["worker.io", "worker.db"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProcessSpec {
    /// Logical/display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Full invocation tokens; `cmd[0]` is the executable.
    #[serde(default, deserialize_with = "tokens")]
    pub cmd: Vec<String>,

    /// Overrides `cmd` for starting.
    #[serde(default, deserialize_with = "optional_tokens")]
    pub start_cmd: Option<Vec<String>>,

    /// If present, stopping runs this instead of signalling.
    #[serde(default, deserialize_with = "optional_tokens")]
    pub stop_cmd: Option<Vec<String>>,

    /// Executable filename; defaults to `name`.
    #[serde(default)]
    pub ex_name: Option<String>,

    /// Name as it appears in the process table; defaults to the resolved
    /// executable's basename.
    #[serde(default)]
    pub ps_name: Option<String>,

    /// Process-table names of expected child processes. Accepts a list or a
    /// single whitespace-separated string.
    #[serde(default, deserialize_with = "tokens")]
    pub children: Vec<String>,

    /// Working directory.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

/// A specification after defaults and executable resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    pub name: String,
    /// Bare PATH name, or a `./`-prefixed path relative to `cwd`.
    pub ex_name: String,
    /// Arguments following the executable.
    pub args: Vec<String>,
    pub ps_name: String,
    /// Unique, in first-seen order.
    pub children: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stop_cmd: Option<Vec<String>>,
    /// `false` when the executable could not be located; starting is then a
    /// no-op.
    pub resolved: bool,
}

impl ProcessConfig {
    /// Full start command line: executable followed by its arguments.
    pub fn start_cmd(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.ex_name.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TokensField {
    Line(String),
    List(Vec<String>),
}

impl TokensField {
    fn into_tokens(self) -> Vec<String> {
        match self {
            TokensField::Line(s) => s.split_whitespace().map(str::to_string).collect(),
            TokensField::List(v) => v,
        }
    }
}

fn tokens<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(TokensField::deserialize(deserializer)?.into_tokens())
}

fn optional_tokens<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TokensField>::deserialize(deserializer)?.map(TokensField::into_tokens))
}
