//! Rate Limit Module
//!
//! Fixed-window request throttling per client and route, with the axum
//! middleware that turns rejections into 429 responses.

mod client;
mod config;
mod limiter;
mod middleware;
mod window;


// Re-export public types
pub use client::{client_identifier, UNKNOWN_CLIENT};
pub use config::RateLimitConfig;
pub use limiter::RateLimiter;
pub use middleware::{rate_limit, too_many_requests, RouteLimit};
pub use window::{RateLimitDecision, RateLimitWindow};
