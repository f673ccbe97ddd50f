//! Cache Store Module
//!
//! Main cache engine: TTL expiry on read, targeted invalidation and the
//! `with_cache` wrapper used by request handlers. Storage faults never reach
//! the caller; they are logged and treated as a miss or a no-op.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::backend::CacheBackend;
use crate::cache::{normalize_key, CacheEntry, CacheStats};
use crate::clock::Clock;

// == Cache Store ==
/// JSON cache with per-entry TTL over a pluggable storage backend.
#[derive(Debug)]
pub struct CacheStore {
    /// Persistence medium
    backend: Box<dyn CacheBackend>,
    /// Time source for stamping and expiry checks
    clock: Arc<dyn Clock>,
    /// When false, `with_cache` always calls through to the producer
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore over `backend`, reading time from `clock`.
    pub fn new(backend: impl CacheBackend + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend: Box::new(backend),
            clock,
            enabled: true,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Enables or disables caching in `with_cache`.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns whether `with_cache` consults the cache.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // == Set ==
    /// Stores `data` under `key` for `ttl_seconds`, replacing any previous entry.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, data: &T, ttl_seconds: u64) {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(e) => {
                warn!("Cache set skipped for '{}': {}", key, e);
                return;
            }
        };

        let entry = CacheEntry::new(data, self.clock.now_ms(), ttl_seconds);
        if let Err(e) = self.backend.write(&normalize_key(key), &entry) {
            warn!("Cache write failed for '{}': {}", key, e);
        }
    }

    // == Get ==
    /// Retrieves the payload stored under `key`.
    ///
    /// Returns `None` if nothing is stored, the entry has expired, or the
    /// backend failed. Expired entries are removed as a side effect.
    pub fn get(&self, key: &str) -> Option<Value> {
        let data = self.lookup(key);
        if data.is_some() {
            self.record_hit();
        }
        data
    }

    /// Retrieves the payload under `key` decoded as `T`.
    ///
    /// A payload that does not decode as `T` is treated as absent and counted
    /// as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = self.lookup(key)?;
        match serde_json::from_value(data) {
            Ok(value) => {
                self.record_hit();
                Some(value)
            }
            Err(e) => {
                warn!("Cached payload for '{}' has unexpected shape: {}", key, e);
                self.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes the entry for `key`. Deleting a missing key is a no-op.
    ///
    /// Returns whether an entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        match self.backend.remove(&normalize_key(key)) {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Cache delete failed for '{}': {}", key, e);
                false
            }
        }
    }

    // == Delete Pattern ==
    /// Removes every entry whose normalized key contains the normalized
    /// `pattern`. Returns the number of entries removed.
    pub fn delete_pattern(&self, pattern: &str) -> usize {
        let needle = normalize_key(pattern);
        self.remove_where(|stored_id, _| stored_id.contains(&needle))
    }

    // == Clear ==
    /// Removes every entry. Returns the number of entries removed.
    pub fn clear(&self) -> usize {
        match self.backend.remove_all() {
            Ok(count) => count,
            Err(e) => {
                warn!("Cache clear failed: {}", e);
                0
            }
        }
    }

    // == Stats ==
    /// Returns a snapshot of the cache contents. Never removes anything.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ..CacheStats::default()
        };

        let now = self.clock.now_ms();
        match self.backend.scan() {
            Ok(records) => {
                for record in records {
                    let valid = record
                        .entry
                        .as_ref()
                        .is_some_and(|entry| !entry.is_expired(now));
                    stats.record_entry(valid, record.size_bytes);
                }
            }
            Err(e) => warn!("Cache scan failed: {}", e),
        }
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired or unreadable entries.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now_ms();
        self.remove_where(|_, entry| entry.map_or(true, |entry| entry.is_expired(now)))
    }

    // == With Cache ==
    /// Returns the cached value for `key`, or runs `produce` and caches its
    /// result for `ttl_seconds`.
    ///
    /// `produce` runs at most once per call. Its error is returned unchanged
    /// and nothing is stored. With caching disabled the cache is bypassed.
    ///
    /// Backend calls run inline on the calling task. Each touches a single
    /// entry (one small file for [`FileBackend`](crate::cache::FileBackend));
    /// whole-store scans belong to the periodic sweep, which moves them onto
    /// the blocking pool.
    pub async fn with_cache<T, E, F, Fut>(
        &self,
        key: &str,
        produce: F,
        ttl_seconds: u64,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            return produce().await;
        }

        if let Some(cached) = self.get_as::<T>(key) {
            debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        debug!("Cache miss: {}", key);
        let value = produce().await?;
        self.set(key, &value, ttl_seconds);
        Ok(value)
    }

    // == Helpers ==
    /// Reads a live entry's payload, recording a miss when there is none.
    fn lookup(&self, key: &str) -> Option<Value> {
        let id = normalize_key(key);

        let entry = match self.backend.read(&id) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                self.record_miss();
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for '{}': {}", key, e);
                self.record_miss();
                return None;
            }
        };

        if entry.is_expired(self.clock.now_ms()) {
            debug!("Cache entry expired: {}", key);
            if let Err(e) = self.backend.remove(&id) {
                warn!("Failed to remove expired cache entry '{}': {}", key, e);
            }
            self.record_miss();
            return None;
        }

        Some(entry.data)
    }

    fn remove_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&str, Option<&CacheEntry>) -> bool,
    {
        let records = match self.backend.scan() {
            Ok(records) => records,
            Err(e) => {
                warn!("Cache scan failed: {}", e);
                return 0;
            }
        };

        let mut removed = 0;
        for record in records {
            if !predicate(&record.id, record.entry.as_ref()) {
                continue;
            }
            match self.backend.remove(&record.id) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => warn!("Failed to remove cache entry '{}': {}", record.id, e),
            }
        }
        removed
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}
