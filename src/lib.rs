//! Site Cache - content caching and request throttling for a site CMS
//!
//! Provides a JSON cache with TTL expiry and pattern invalidation, and a
//! fixed-window rate limiter, served behind an Axum content API.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
