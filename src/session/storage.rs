//! Key-value persistence for the session.
//!
//! `FileStore` keeps every key in one JSON object on disk and replaces the
//! file through a temporary sibling so a crash never leaves half a write.
//! `MemoryStore` is the in-process equivalent.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Local session storage could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Session storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Session storage unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed persistent storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Write all `entries` together.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), PersistenceError>;

    fn remove_many(&self, keys: &[&str]) -> Result<(), PersistenceError>;
}

/// Keys persisted in a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, text).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, PersistenceError> {
        self.lock
            .lock()
            .map_err(|_| PersistenceError::Unavailable("file store lock poisoned".into()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let _guard = self.guard()?;
        Ok(self.read_all()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), PersistenceError> {
        let _guard = self.guard()?;
        // A corrupt file is overwritten rather than blocking every login.
        let mut all = self.read_all().unwrap_or_default();
        for (key, value) in entries {
            all.insert(key.to_string(), value.clone());
        }
        self.write_all(&all)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), PersistenceError> {
        let _guard = self.guard()?;
        let mut all = self.read_all().unwrap_or_default();
        for key in keys {
            all.remove(*key);
        }
        self.write_all(&all)
    }
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, PersistenceError> {
        self.entries
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), PersistenceError> {
        let mut all = self.entries()?;
        for (key, value) in entries {
            all.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), PersistenceError> {
        let mut all = self.entries()?;
        for key in keys {
            all.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("shortly-store-{}-{}", name, uuid::Uuid::new_v4()))
            .join("session.json")
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = temp_path("roundtrip");
        let store = FileStore::new(&path);
        assert_eq!(store.get("k").unwrap(), None);

        store.set_many(&[("a", "1".into()), ("b", "2".into())]).unwrap();
        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1"));

        reopened.remove_many(&["a"]).unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get("a"), Err(PersistenceError::Corrupt(_))));

        store.set_many(&[("a", "1".into())]).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.set_many(&[("x", "y".into())]).unwrap();
        assert_eq!(store.get("x").unwrap().as_deref(), Some("y"));
        store.remove_many(&["x", "missing"]).unwrap();
        assert_eq!(store.get("x").unwrap(), None);
    }
}
