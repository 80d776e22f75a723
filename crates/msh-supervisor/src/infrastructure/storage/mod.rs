//! Storage infrastructure: configuration document persistence.
//!
//! The [`PersistenceBackend`] trait is the only way the application layer
//! reaches the configuration file.  Two implementations live here:
//!
//! - [`config::JsonFileBackend`] – reads and writes a file on disk
//!   (`config.json` in the working directory unless told otherwise).
//! - [`mock::InMemoryBackend`] – keeps the document in memory for tests.

use std::path::PathBuf;

use thiserror::Error;

pub mod config;
pub mod mock;

/// Error type for persistence backend operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory backend holds no document.
    #[error("no configuration document stored")]
    Empty,
}

/// Reads and writes the raw bytes of the configuration document.
///
/// Both methods address the same fixed location; the backend decides where
/// that is.
#[cfg_attr(test, mockall::automock)]
pub trait PersistenceBackend {
    /// Returns the full stored document.
    fn read(&self) -> Result<Vec<u8>, StorageError>;
    /// Replaces the stored document with `contents`.
    fn write(&self, contents: &[u8]) -> Result<(), StorageError>;
}
