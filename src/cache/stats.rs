//! Cache Statistics Module
//!
//! Snapshot of what the cache currently holds plus lookup counters.

use serde::Serialize;

// == Cache Stats ==
/// Diagnostic view of the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of stored entries, valid or not
    pub total_entries: usize,
    /// Entries still within their TTL
    pub valid_entries: usize,
    /// Entries past their TTL (or unreadable) that have not been removed yet
    pub expired_entries: usize,
    /// Combined size of all stored entries in bytes
    pub total_size_bytes: u64,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (absent, expired or unreadable)
    pub misses: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Entry ==
    /// Classifies one scanned entry.
    pub fn record_entry(&mut self, valid: bool, size_bytes: u64) {
        self.total_entries += 1;
        if valid {
            self.valid_entries += 1;
        } else {
            self.expired_entries += 1;
        }
        self.total_size_bytes += size_bytes;
    }
}
