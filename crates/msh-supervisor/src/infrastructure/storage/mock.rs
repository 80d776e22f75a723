//! In-memory persistence backend for unit and integration testing.

use std::sync::{Arc, Mutex};

use super::{PersistenceBackend, StorageError};

/// A [`PersistenceBackend`] that keeps the document in memory.
///
/// Clones share the same storage, so a test can hand one clone to a
/// `ConfigManager` and inspect the written bytes through another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    document: Arc<Mutex<Option<Vec<u8>>>>,
    write_count: Arc<Mutex<u32>>,
}

impl InMemoryBackend {
    /// Creates an empty backend; reading it fails with [`StorageError::Empty`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that already holds `contents`.
    pub fn with_document(contents: impl Into<Vec<u8>>) -> Self {
        let backend = Self::new();
        *backend.document.lock().expect("lock poisoned") = Some(contents.into());
        backend
    }

    /// Returns the stored document, if any.
    pub fn document(&self) -> Option<Vec<u8>> {
        self.document.lock().expect("lock poisoned").clone()
    }

    /// Returns the number of successful writes.
    pub fn write_count(&self) -> u32 {
        *self.write_count.lock().expect("lock poisoned")
    }
}

impl PersistenceBackend for InMemoryBackend {
    fn read(&self) -> Result<Vec<u8>, StorageError> {
        self.document().ok_or(StorageError::Empty)
    }

    fn write(&self, contents: &[u8]) -> Result<(), StorageError> {
        *self.document.lock().expect("lock poisoned") = Some(contents.to_vec());
        *self.write_count.lock().expect("lock poisoned") += 1;
        Ok(())
    }
}
