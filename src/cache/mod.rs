//! Cache Module
//!
//! JSON payload cache with TTL expiration, pattern invalidation and
//! swappable storage (in-memory or one file per key).

mod backend;
mod entry;
mod file;
mod key;
mod stats;
mod store;


// Re-export public types
pub use backend::{CacheBackend, MemoryBackend, StoredEntry};
pub use entry::CacheEntry;
pub use file::FileBackend;
pub use key::normalize_key;
pub use stats::CacheStats;
pub use store::CacheStore;
