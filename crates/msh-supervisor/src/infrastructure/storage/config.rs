//! File-based configuration persistence.
//!
//! The document lives at a fixed path, by default `config.json` relative to
//! the process working directory.  Writes go to a sibling `*.tmp` file that is
//! renamed over the target once fully flushed, so an interrupted save leaves
//! the previous document intact.  On Unix the file is created with mode
//! `0644`.
//!
//! Known trade-off of the rename: if `config.json` is a symlink, a save
//! replaces the link with a regular file instead of writing through it, and
//! any mode the existing file had is reset to `0644`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{PersistenceBackend, StorageError};

/// File name used when no explicit path is configured.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// [`PersistenceBackend`] backed by a single file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Creates a backend for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for JsonFileBackend {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

impl PersistenceBackend for JsonFileBackend {
    fn read(&self) -> Result<Vec<u8>, StorageError> {
        fs::read(&self.path).map_err(|e| io_error(&self.path, e))
    }

    fn write(&self, contents: &[u8]) -> Result<(), StorageError> {
        let tmp = self.temp_path();

        let result = write_new_file(&tmp, contents)
            .map_err(|e| io_error(&tmp, e))
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e)));

        if result.is_err() {
            // Leave no half-written temp file behind.
            let _ = fs::remove_file(&tmp);
        }
        result
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn write_new_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
