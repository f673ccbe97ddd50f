//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::content::Collection;

/// Response body for content writes (PUT / DELETE under /api/admin/content)
#[derive(Debug, Clone, Serialize)]
pub struct ContentWriteResponse {
    /// Success message
    pub message: String,
    /// Collection that was modified
    pub collection: Collection,
    /// Id of the affected document
    pub id: String,
    /// Cache entries invalidated by the write
    pub invalidated: usize,
}

impl ContentWriteResponse {
    /// Creates a response for a saved document
    pub fn saved(collection: Collection, id: impl Into<String>, invalidated: usize) -> Self {
        let id = id.into();
        Self {
            message: format!("Document '{}' saved to {}", id, collection),
            collection,
            id,
            invalidated,
        }
    }

    /// Creates a response for a deleted document
    pub fn deleted(collection: Collection, id: impl Into<String>, invalidated: usize) -> Self {
        let id = id.into();
        Self {
            message: format!("Document '{}' deleted from {}", id, collection),
            collection,
            id,
            invalidated,
        }
    }
}

/// Response body for cache invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    /// Creates a new InvalidateResponse
    pub fn new(message: impl Into<String>, removed: usize) -> Self {
        Self {
            message: message.into(),
            removed,
        }
    }
}

/// Response body for the cache stats endpoint (GET /api/admin/cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    /// Whether `with_cache` is consulting the cache
    pub enabled: bool,
    /// Entries currently stored
    pub total_entries: usize,
    /// Entries within their TTL
    pub valid_entries: usize,
    /// Entries past their TTL awaiting removal
    pub expired_entries: usize,
    /// Bytes used by stored entries
    pub total_size_bytes: u64,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl CacheStatsResponse {
    /// Creates a new CacheStatsResponse from cache statistics
    pub fn new(enabled: bool, stats: &CacheStats) -> Self {
        Self {
            enabled,
            total_entries: stats.total_entries,
            valid_entries: stats.valid_entries,
            expired_entries: stats.expired_entries,
            total_size_bytes: stats.total_size_bytes,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for GET /api/admin/rate-limit/stats
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatsResponse {
    /// Client+route windows currently tracked
    pub active_windows: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
