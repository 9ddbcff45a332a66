//! Browser `localStorage` backend.

use super::{NoteStorage, StorageError};
use web_sys::{wasm_bindgen::JsValue, Storage};

const LOCAL_STORAGE_PREFIX: &str = "notes-";

impl From<JsValue> for StorageError {
    fn from(err: JsValue) -> Self {
        StorageError::WebSys(format!("{err:?}"))
    }
}

/// Implementation of [`NoteStorage`] over `window.localStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    /// Creates a new instance of [`LocalStorage`].
    pub fn new() -> Self {
        Self
    }

    fn get_local_storage(&self) -> Result<Storage, StorageError> {
        gloo_utils::window()
            .local_storage()?
            .ok_or_else(|| StorageError::WebSys("LocalStorage not available".to_string()))
    }
}

impl NoteStorage for LocalStorage {
    fn get(&mut self, key: &str) -> Result<Option<String>, StorageError> {
        let local_storage = self.get_local_storage()?;
        let key = format!("{}{}", LOCAL_STORAGE_PREFIX, key);
        Ok(local_storage.get_item(&key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let local_storage = self.get_local_storage()?;
        let key = format!("{}{}", LOCAL_STORAGE_PREFIX, key);
        local_storage.set_item(&key, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let local_storage = self.get_local_storage()?;
        let key = format!("{}{}", LOCAL_STORAGE_PREFIX, key);
        local_storage.remove_item(&key)?;
        Ok(())
    }
}

impl From<LocalStorage> for Box<dyn NoteStorage> {
    fn from(storage: LocalStorage) -> Self {
        Box::new(storage)
    }
}
