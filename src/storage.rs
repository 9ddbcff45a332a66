//! Persistence for notes that have not reached the backend yet.
//!
//! A [`Notebook`](crate::Notebook) writes its local notes as a JSON array under
//! [`KEY_STORAGE_PENDING`] whenever that set changes, and reads it back on construction.

use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

#[cfg(all(feature = "file", not(target_family = "wasm")))]
pub mod file;
#[cfg(feature = "wasm-js")]
pub mod wasm_js;

#[cfg(all(feature = "file", not(target_family = "wasm")))]
pub use file::FileStorage;
#[cfg(feature = "wasm-js")]
pub use wasm_js::LocalStorage;

/// A key for storing the notes awaiting reconciliation.
pub const KEY_STORAGE_PENDING: &str = "pending-notes";

/// An error raised by a [`NoteStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a storage file failed.
    #[error("File error: {0}")]
    File(String),
    /// A stored value could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The browser storage API failed or is unavailable.
    #[error("WebSys error: {0}")]
    WebSys(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::File(err.to_string())
    }
}

/// Trait for persisting string values by key.
pub trait NoteStorage: Send {
    /// Retrieves a stored value by key.
    ///
    /// # Returns
    /// * `Ok(Some(value))` if the key exists in storage
    /// * `Ok(None)` if the key does not exist
    /// * `Err(StorageError)` if an error occurred
    fn get(&mut self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores a value under the given key, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a stored value by key. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage. Clones share the same underlying map.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates a new, empty [`MemoryStorage`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteStorage for MemoryStorage {
    fn get(&mut self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

impl From<MemoryStorage> for Box<dyn NoteStorage> {
    fn from(storage: MemoryStorage) -> Self {
        Box::new(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trips_values() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("test").unwrap(), None);
        storage.set("test", "value").unwrap();
        assert_eq!(storage.get("test").unwrap().as_deref(), Some("value"));
        storage.remove("test").unwrap();
        assert_eq!(storage.get("test").unwrap(), None);
        storage.remove("test").unwrap();
    }

    #[test]
    fn memory_storage_clones_share_values() {
        let mut storage = MemoryStorage::new();
        let mut clone = storage.clone();
        storage.set(KEY_STORAGE_PENDING, "[]").unwrap();
        assert_eq!(clone.get(KEY_STORAGE_PENDING).unwrap().as_deref(), Some("[]"));
    }
}
