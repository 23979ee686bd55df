//! JSON file acting as the durable key-value store for the CLI host.
//!
//! The whole file is one JSON object of string keys to string values, the
//! same shape a browser's `localStorage` exposes. Every write rewrites the
//! file through a sibling temp file and a rename, so a crash never leaves a
//! half-written store behind.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use room::persistence::{KeyValueStore, StorageError};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Entries(BTreeMap<String, String>);

/// [`KeyValueStore`] persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Entries,
}

impl FileStore {
    /// Open `path`, treating a missing file as an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read and
    /// [`StorageError::Json`] if its contents are not a string map.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Entries::default(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Entries::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.0.len(), "file store opened");
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `entries` to disk, adopting them only once the rename succeeded.
    fn commit(&mut self, entries: Entries) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(&entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        self.entries = entries;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut next = self.entries.clone();
        next.0.insert(key.to_owned(), value.to_owned());
        self.commit(next)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.entries.0.contains_key(key) {
            return Ok(());
        }
        let mut next = self.entries.clone();
        next.0.remove(key);
        self.commit(next)
    }
}
