//! Mock environment prober for unit testing.
//!
//! Lets tests describe a machine (which paths exist, which executables are
//! installed, which OS it runs) without touching the real file system.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use msh_core::OsFamily;

use super::EnvironmentProber;

/// A mock implementation of [`EnvironmentProber`] with a fixed world view.
#[derive(Debug, Clone)]
pub struct MockProber {
    paths: HashSet<PathBuf>,
    executables: HashSet<String>,
    os: OsFamily,
}

impl MockProber {
    /// Creates a prober for an empty `os` machine: no paths, no executables.
    pub fn new(os: OsFamily) -> Self {
        Self {
            paths: HashSet::new(),
            executables: HashSet::new(),
            os,
        }
    }

    /// Marks `path` as existing.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(path.into());
        self
    }

    /// Marks `name` as resolvable on the search path.
    pub fn with_executable(mut self, name: impl Into<String>) -> Self {
        self.executables.insert(name.into());
        self
    }
}

impl EnvironmentProber for MockProber {
    fn path_exists(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    fn executable_on_path(&self, name: &str) -> bool {
        self.executables.contains(name)
    }

    fn os_family(&self) -> OsFamily {
        self.os
    }
}
