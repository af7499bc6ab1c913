// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEntry {
    File,
    Dir,
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    on_path: HashSet<String>,
}

/// In-memory filesystem for resolver tests.
///
/// Paths are expected to be absolute; relative inputs are joined onto the
/// mock current directory (default `/work`).
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
    cwd: PathBuf,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_current_dir("/work")
    }

    pub fn with_current_dir(cwd: impl Into<PathBuf>) -> Self {
        let fs = Self {
            state: Arc::new(Mutex::new(MockState::default())),
            cwd: cwd.into(),
        };
        let cwd = fs.cwd.clone();
        fs.add_dir(cwd);
        fs
    }

    /// Register an executable file; parent directories are created implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = self.absolute(path.as_ref());
        let mut state = self.state.lock().unwrap();
        Self::ensure_parents(&mut state.entries, &path);
        state.entries.insert(path, MockEntry::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.absolute(path.as_ref());
        let mut state = self.state.lock().unwrap();
        Self::ensure_parents(&mut state.entries, &path);
        state.entries.insert(path, MockEntry::Dir);
    }

    /// Make `name` resolvable through `find_on_path` (as `/usr/bin/<name>`).
    pub fn add_on_path(&self, name: &str) {
        self.state.lock().unwrap().on_path.insert(name.to_string());
    }

    fn ensure_parents(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if p.as_os_str().is_empty() {
                break;
            }
            entries.entry(p.to_path_buf()).or_insert(MockEntry::Dir);
            parent = p.parent();
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        };
        normalize(&joined)
    }

    fn entry(&self, path: &Path) -> Option<MockEntry> {
        let path = self.absolute(path);
        self.state.lock().unwrap().entries.get(&path).copied()
    }
}

/// Lexically collapse `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.entry(path).is_some()
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entry(path), Some(MockEntry::File))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entry(path), Some(MockEntry::Dir))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let abs = self.absolute(path);
        if self.state.lock().unwrap().entries.contains_key(&abs) {
            Ok(abs)
        } else {
            Err(anyhow!("No such file or directory: {:?}", path))
        }
    }

    fn current_dir(&self) -> Result<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn find_on_path(&self, name: &str) -> Option<PathBuf> {
        let state = self.state.lock().unwrap();
        state
            .on_path
            .contains(name)
            .then(|| PathBuf::from("/usr/bin").join(name))
    }
}
