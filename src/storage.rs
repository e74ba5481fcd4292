//! Durable string key-value storage.
//!
//! Queue sessions, playlists, the last-played marker and preference flags all
//! live here. Reads never fail loudly: missing or unreadable content is
//! treated as absence. Writes can genuinely fail (full disk, permissions) and
//! report the error so callers can warn the user.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Storage write errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write key {key:?}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no usable data directory")]
    NoDataDir,
}

/// Synchronous string-keyed storage.
pub trait KvStore: Send + Sync {
    /// Read a value. Any read or decode failure is treated as absence.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

/// File-backed store: one file per key under the platform data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the store under the platform data directory.
    pub fn open() -> Result<Self, StorageError> {
        let dir = dirs::data_dir()
            .ok_or(StorageError::NoDataDir)?
            .join("chapel-tui")
            .join("store");

        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Write {
            key: dir.display().to_string(),
            source,
        })?;

        Ok(Self { dir })
    }

    #[cfg(test)]
    pub fn open_at(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are internal identifiers; only guard against separators.
        let safe: String = key
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(safe)
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("storage read failed for {}: {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })?;

        std::fs::write(self.path_for(key), value).map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&self, key: &str) {
        if let Err(e) = std::fs::remove_file(self.path_for(key)) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("storage remove failed for {}: {}", key, e);
            }
        }
    }
}

/// In-memory store used by `--ephemeral` runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.map.lock().unwrap().remove(key);
    }
}

/// Store whose writes always fail, for exercising write-failure paths.
#[cfg(test)]
pub struct FailingStore {
    inner: MemoryStore,
}

#[cfg(test)]
impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
        }
    }
}

#[cfg(test)]
impl KvStore for FailingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            key: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "store full"),
        })
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Some(String::from("v")));

        store.remove("k");
        assert_eq!(store.get("k"), None);

        // Removing again is a no-op.
        store.remove("k");
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("chapel-tui-test-{}", std::process::id()));
        let store = FileStore::open_at(dir.clone());

        store.set("session", "{\"x\":1}").unwrap();
        assert_eq!(store.get("session"), Some(String::from("{\"x\":1}")));

        store.remove("session");
        assert_eq!(store.get("session"), None);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_failing_store_reports_write_error() {
        let store = FailingStore::new();
        assert!(store.set("k", "v").is_err());
        assert_eq!(store.get("k"), None);
    }
}
