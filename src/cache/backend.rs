//! Storage Backend Module
//!
//! Abstracts where cache entries live. The store only speaks to this trait,
//! so the in-memory and on-disk media are interchangeable.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use crate::cache::CacheEntry;
use crate::error::{StorageError, StorageResult};

// == Stored Entry ==
/// One record as seen by a full scan of the backend.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// Normalized storage identifier
    pub id: String,
    /// Decoded entry, `None` if the stored bytes are not a valid entry
    pub entry: Option<CacheEntry>,
    /// Size of the stored representation in bytes
    pub size_bytes: u64,
}

// == Backend Trait ==
/// Persistence medium for cache entries, addressed by normalized identifier.
pub trait CacheBackend: Send + Sync + Debug {
    /// Reads the entry stored under `id`.
    fn read(&self, id: &str) -> StorageResult<Option<CacheEntry>>;

    /// Stores `entry` under `id`, replacing any previous entry.
    fn write(&self, id: &str, entry: &CacheEntry) -> StorageResult<()>;

    /// Removes the entry under `id`. Returns whether something was removed.
    fn remove(&self, id: &str) -> StorageResult<bool>;

    /// Lists every stored record without modifying anything.
    fn scan(&self) -> StorageResult<Vec<StoredEntry>>;

    /// Removes every record. Returns how many were removed.
    fn remove_all(&self) -> StorageResult<usize>;
}

// == Memory Backend ==
/// Keeps serialized entries in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheBackend for MemoryBackend {
    fn read(&self, id: &str) -> StorageResult<Option<CacheEntry>> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        match records.get(id) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn write(&self, id: &str, entry: &CacheEntry) -> StorageResult<()> {
        let raw = serde_json::to_string(entry)?;
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        records.insert(id.to_string(), raw);
        Ok(())
    }

    fn remove(&self, id: &str) -> StorageResult<bool> {
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.remove(id).is_some())
    }

    fn scan(&self) -> StorageResult<Vec<StoredEntry>> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(records
            .iter()
            .map(|(id, raw)| StoredEntry {
                id: id.clone(),
                entry: serde_json::from_str(raw).ok(),
                size_bytes: raw.len() as u64,
            })
            .collect())
    }

    fn remove_all(&self) -> StorageResult<usize> {
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        let count = records.len();
        records.clear();
        Ok(count)
    }
}
