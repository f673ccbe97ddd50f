//! Cache Entry Module
//!
//! Defines the record persisted for each cached key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A cached payload together with the time it was stored and its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored payload
    pub data: Value,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Validity duration from creation, in milliseconds
    #[serde(rename = "ttl")]
    pub ttl_millis: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped at `now_ms` that lives for `ttl_seconds`.
    pub fn new(data: Value, now_ms: u64, ttl_seconds: u64) -> Self {
        Self {
            data,
            timestamp: now_ms,
            ttl_millis: ttl_seconds.saturating_mul(1000),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry stays valid while `now - timestamp <= ttl`, so it is still
    /// served at exactly its TTL and expires one millisecond later. A clock
    /// that moved backwards past the creation time leaves the entry valid.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp) > self.ttl_millis
    }
}
