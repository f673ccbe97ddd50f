//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries and
//! elapsed rate limit windows, so neither grows without bound.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::ratelimit::RateLimiter;

/// Spawns a background task that periodically sweeps the cache and the
/// rate limiter.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between runs.
///
/// # Arguments
/// * `cache` - Shared cache store
/// * `limiter` - Shared rate limiter
/// * `cleanup_interval_secs` - Interval in seconds between runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    cache: Arc<CacheStore>,
    limiter: Arc<RateLimiter>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            // The sweep touches the filesystem for file-backed caches
            let sweep_cache = cache.clone();
            let removed = tokio::task::spawn_blocking(move || sweep_cache.cleanup_expired())
                .await
                .unwrap_or(0);
            let purged = limiter.purge_expired();

            if removed > 0 || purged > 0 {
                info!(
                    "Expiry sweep: removed {} cache entries, {} rate limit windows",
                    removed, purged
                );
            } else {
                debug!("Expiry sweep: nothing to remove");
            }
        }
    })
}
