//! Storage backends
//!
//! A single-slot-per-key string store, the way browser local storage behaves.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tempfile::NamedTempFile;

use crate::error::{Result, StoreError};

/// Durable key → string storage
pub trait StorageBackend: Send + Sync {
    /// Read a slot; `Ok(None)` when it was never written
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a slot. On error the previous value must survive intact.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a slot; missing slots are not an error
    fn remove_item(&self, key: &str) -> Result<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local storage with an optional byte quota
///
/// The quota counts key and value bytes of every slot, like a browser's
/// per-origin limit.
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
    quota: RwLock<Option<usize>>,
}

impl MemoryStorage {
    /// Create unbounded storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that refuses writes beyond `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::new();
        storage.set_quota(Some(bytes));
        storage
    }

    /// Change (or lift) the quota
    pub fn set_quota(&self, bytes: Option<usize>) {
        *self.quota.write() = bytes;
    }

    /// Bytes currently used across all slots
    pub fn used_bytes(&self) -> usize {
        self.items
            .read()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write();

        if let Some(quota) = *self.quota.read() {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().remove(key);
        Ok(())
    }
}

// =============================================================================
// File-backed
// =============================================================================

/// One JSON file per slot under a directory
///
/// Writes go to a temp file in the same directory and are renamed over the
/// slot, so a failed write leaves the previous document in place.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open or create storage rooted at `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.slot_path(key))
            .map_err(|e| StoreError::Persistence(format!("rename failed: {}", e.error)))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
