//! Rate Limit Configuration
//!
//! Per-route throttling parameters and the presets used by the site.

use serde::Serialize;

// == Rate Limit Config ==
/// How many requests a client may make to one route per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitConfig {
    /// Window length in milliseconds
    pub interval_ms: u64,
    /// Requests accepted per window
    pub max_requests: u32,
}

impl RateLimitConfig {
    /// Creates a config allowing `max_requests` per `interval_ms`.
    pub const fn new(max_requests: u32, interval_ms: u64) -> Self {
        Self {
            interval_ms,
            max_requests,
        }
    }

    /// Login attempts: 5 per 15 minutes.
    pub const fn login() -> Self {
        Self::new(5, 15 * 60 * 1000)
    }

    /// Uploads: 10 per minute.
    pub const fn upload() -> Self {
        Self::new(10, 60 * 1000)
    }

    /// General API traffic: 100 per minute.
    pub const fn api() -> Self {
        Self::new(100, 60 * 1000)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::api()
    }
}
