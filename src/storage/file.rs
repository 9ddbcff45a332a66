//! File-based storage implementation for native environments.
//!
//! Each key is persisted to its own JSON file inside a directory.

use super::{NoteStorage, StorageError};
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::PathBuf};

const FILE_STORAGE_PREFIX: &str = "notes-";
const STORAGE_FILE_EXTENSION: &str = "json";

/// File-based storage backend that persists values to JSON files on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredValue {
    value: String,
}

impl FileStorage {
    /// Creates a new instance of [`FileStorage`].
    ///
    /// # Arguments
    ///
    /// * `directory` - The directory where the storage files will be stored. It is
    ///   created on the first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn ensure_directory(&self) -> Result<(), StorageError> {
        if self.directory.as_os_str().is_empty() {
            return Ok(()); // current directory
        }
        fs::create_dir_all(&self.directory)?;
        Ok(())
    }

    fn file_path(&self, key: &str) -> PathBuf {
        let sanitized_key = sanitize_key(key);
        self.directory.join(format!(
            "{FILE_STORAGE_PREFIX}{sanitized_key}.{STORAGE_FILE_EXTENSION}"
        ))
    }
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '.') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

impl NoteStorage for FileStorage {
    fn get(&mut self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.file_path(key)) {
            Ok(contents) => {
                let stored: StoredValue = serde_json::from_str(&contents)?;
                Ok(Some(stored.value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_directory()?;
        let serialized = serde_json::to_string(&StoredValue {
            value: value.to_string(),
        })?;
        fs::write(self.file_path(key), serialized)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.file_path(key)) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from(e)),
        }
    }
}

impl From<FileStorage> for Box<dyn NoteStorage> {
    fn from(storage: FileStorage) -> Self {
        Box::new(storage)
    }
}
