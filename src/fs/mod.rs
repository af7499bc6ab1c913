// src/fs/mod.rs

//! Filesystem view used by executable resolution.
//!
//! Only the queries the resolver needs are exposed, which keeps
//! [`mock::MockFileSystem`] small enough to describe a whole test world.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Absolute path with symlinks and `.`/`..` resolved. Fails if the path
    /// does not exist.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    fn current_dir(&self) -> Result<PathBuf>;

    /// Where a shell would find `name` on `PATH`, if anywhere.
    fn find_on_path(&self, name: &str) -> Option<PathBuf>;
}

/// The host filesystem and the caller's `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        path.canonicalize()
            .with_context(|| format!("canonicalizing {}", path.display()))
    }

    fn current_dir(&self) -> Result<PathBuf> {
        std::env::current_dir().context("reading current directory")
    }

    fn find_on_path(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}
