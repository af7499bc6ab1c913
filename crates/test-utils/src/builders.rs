#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use procctl::config::{ConfigFile, ConfigSection, RawConfigFile};
use procctl::control::ProcessSpec;

/// Builder for `ProcessSpec` to simplify test setup.
#[derive(Debug, Clone, Default)]
pub struct ProcessSpecBuilder {
    spec: ProcessSpec,
}

impl ProcessSpecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.spec.name = Some(name.to_string());
        self
    }

    pub fn cmd(mut self, tokens: &[&str]) -> Self {
        self.spec.cmd = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn start_cmd(mut self, tokens: &[&str]) -> Self {
        self.spec.start_cmd = Some(tokens.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn stop_cmd(mut self, tokens: &[&str]) -> Self {
        self.spec.stop_cmd = Some(tokens.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn ex_name(mut self, ex_name: &str) -> Self {
        self.spec.ex_name = Some(ex_name.to_string());
        self
    }

    pub fn ps_name(mut self, ps_name: &str) -> Self {
        self.spec.ps_name = Some(ps_name.to_string());
        self
    }

    pub fn child(mut self, name: &str) -> Self {
        self.spec.children.push(name.to_string());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.spec.cwd = Some(cwd.into());
        self
    }

    pub fn build(self) -> ProcessSpec {
        self.spec
    }
}

/// Builder for `ConfigFile`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                process: BTreeMap::new(),
            },
        }
    }

    pub fn with_process(mut self, key: &str, spec: ProcessSpec) -> Self {
        self.config.process.insert(key.to_string(), spec);
        self
    }

    pub fn poll_attempts(mut self, attempts: u32) -> Self {
        self.config.config.poll_attempts = attempts;
        self
    }

    pub fn poll_interval(mut self, interval: &str) -> Self {
        self.config.config.poll_interval = interval.to_string();
        self
    }

    pub fn escalation_wait(mut self, wait: &str) -> Self {
        self.config.config.escalation_wait = wait.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
