//! Keyed string storage behind a port.
//!
//! The gallery library never touches a concrete backend: it reads and writes
//! JSON strings through [`StoragePort`]. [`FileStorage`] persists to a
//! directory; [`MemoryStorage`] keeps everything in a map for tests.
//!
//! ## File layout
//!
//! One file per key, named by the SHA-256 of the key, so arbitrary owner
//! names never turn into path components:
//!
//! ```text
//! .memora/
//! ├── 3f2a…c1.json     # memora_galleries_alice
//! └── 9b07…5e.json     # memora_galleries_bob
//! ```
//!
//! Writes go to a uniquely named temporary sibling first and are renamed
//! into place, so a crash mid-write leaves the previous value intact and
//! concurrent writers of one key never share a temporary file.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// get/set/delete over string keys and values.
pub trait StoragePort {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: StoragePort + ?Sized> StoragePort for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Directory-backed storage, one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the value for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{:x}.json", digest))
    }
}

impl StoragePort for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&path).map_err(|err| err.error)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(storage: &impl StoragePort) {
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "v1").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v1"));
        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));
        storage.delete("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.delete("k").unwrap();
    }

    #[test]
    fn memory_storage_get_set_delete() {
        exercise(&MemoryStorage::new());
    }

    #[test]
    fn file_storage_get_set_delete() {
        let tmp = TempDir::new().unwrap();
        exercise(&FileStorage::open(tmp.path()).unwrap());
    }

    #[test]
    fn file_storage_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested/data");
        let storage = FileStorage::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(storage.dir(), dir);
    }

    #[test]
    fn file_storage_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        FileStorage::open(tmp.path())
            .unwrap()
            .set("memora_galleries_alice", "[]")
            .unwrap();

        let reopened = FileStorage::open(tmp.path()).unwrap();
        assert_eq!(
            reopened.get("memora_galleries_alice").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn keys_never_become_path_components() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::open(tmp.path()).unwrap();
        let path = storage.path_for("../../etc/passwd");
        assert_eq!(path.parent().unwrap(), tmp.path());
        assert_eq!(path.file_name().unwrap().len(), 64 + ".json".len());
    }

    #[test]
    fn set_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::open(tmp.path()).unwrap();
        storage.set("a", "1").unwrap();
        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
    }

    #[test]
    fn concurrent_writers_of_one_key_all_succeed() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::open(tmp.path()).unwrap();
        let values: Vec<String> = (0..8).map(|i| format!("[{i}]")).collect();

        std::thread::scope(|scope| {
            for value in &values {
                let storage = &storage;
                scope.spawn(move || {
                    for _ in 0..20 {
                        storage.set("memora_galleries_ana", value).unwrap();
                    }
                });
            }
        });

        let stored = storage.get("memora_galleries_ana").unwrap().unwrap();
        assert!(values.contains(&stored), "{stored}");
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
