//! Rate Limiter Module
//!
//! In-process fixed-window limiter keyed by client and route. Counters live
//! only in this process: they reset on restart and are not shared between
//! instances, so N instances admit up to N times the configured limit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::clock::Clock;
use crate::ratelimit::{RateLimitConfig, RateLimitDecision, RateLimitWindow};

// == Rate Limiter ==
/// Per client+route request counter.
#[derive(Debug)]
pub struct RateLimiter {
    /// `"{client}:{route}"` -> current window
    windows: Mutex<HashMap<String, RateLimitWindow>>,
    /// Time source for window boundaries
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    // == Constructor ==
    /// Creates an empty limiter reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    // == Check And Record ==
    /// Counts one request from `client` to `route` and decides whether it
    /// may proceed under `config`.
    ///
    /// The lookup, increment and decision happen under a single lock, so
    /// concurrent requests can never push more than `max_requests` through
    /// one window.
    pub fn check_and_record(
        &self,
        client: &str,
        route: &str,
        config: &RateLimitConfig,
    ) -> RateLimitDecision {
        let identifier = format!("{client}:{route}");
        let now = self.clock.now_ms();

        let mut windows = self.lock();
        let window = windows
            .entry(identifier)
            .or_insert_with(|| RateLimitWindow::open(now, config.interval_ms));

        if window.is_elapsed(now) {
            *window = RateLimitWindow::open(now, config.interval_ms);
        }

        window.record(now, config.max_requests)
    }

    // == Purge Expired ==
    /// Drops every window whose reset time has passed.
    ///
    /// Returns the number of windows removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, window| !window.is_elapsed(now));
        let removed = before - windows.len();
        if removed > 0 {
            debug!("Purged {} elapsed rate limit windows", removed);
        }
        removed
    }

    // == Active Windows ==
    /// Returns the number of tracked windows, elapsed or not.
    pub fn active_windows(&self) -> usize {
        self.lock().len()
    }

    /// Counters stay usable even if a holder panicked mid-update.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateLimitWindow>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
