//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::content::Collection;
use crate::ratelimit::RateLimitConfig;

// == Cache TTLs ==
/// Cache lifetimes in seconds, per content collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTtls {
    pub default: u64,
    pub pages: u64,
    pub projects: u64,
    pub services: u64,
    pub team: u64,
    pub customers: u64,
}

impl CacheTtls {
    /// Returns the TTL used for entries derived from `collection`.
    pub fn for_collection(&self, collection: Collection) -> u64 {
        match collection {
            Collection::Pages => self.pages,
            Collection::Projects => self.projects,
            Collection::Services => self.services,
            Collection::Team => self.team,
            Collection::Customers => self.customers,
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            default: 300,
            pages: 600,
            projects: 300,
            services: 600,
            team: 600,
            customers: 600,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// When false every read goes straight to the content store
    pub enable_caching: bool,
    /// Directory for file-backed cache entries, in-memory when unset
    pub cache_dir: Option<PathBuf>,
    /// Per-collection cache lifetimes
    pub cache_ttls: CacheTtls,
    /// Limits for public content reads
    pub public_rate_limit: RateLimitConfig,
    /// Limits for admin writes and cache administration
    pub admin_rate_limit: RateLimitConfig,
    /// JSON file with initial content, keyed by collection
    pub content_seed_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `ENABLE_CACHING` - `true`/`false` (default: true)
    /// - `CACHE_DIR` - Directory for cache files (default: in-memory)
    /// - `CACHE_TTL_DEFAULT`, `CACHE_TTL_PAGES`, `CACHE_TTL_PROJECTS`,
    ///   `CACHE_TTL_SERVICES`, `CACHE_TTL_TEAM`, `CACHE_TTL_CUSTOMERS` - seconds
    /// - `RATE_LIMIT_PUBLIC_MAX`, `RATE_LIMIT_PUBLIC_INTERVAL_MS` (default: 100 / 60000)
    /// - `RATE_LIMIT_ADMIN_MAX`, `RATE_LIMIT_ADMIN_INTERVAL_MS` (default: 10 / 60000)
    /// - `CONTENT_SEED_PATH` - Initial content file (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let ttls = defaults.cache_ttls;

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            enable_caching: env::var("ENABLE_CACHING")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.enable_caching),
            cache_dir: env_path("CACHE_DIR"),
            cache_ttls: CacheTtls {
                default: env_or("CACHE_TTL_DEFAULT", ttls.default),
                pages: env_or("CACHE_TTL_PAGES", ttls.pages),
                projects: env_or("CACHE_TTL_PROJECTS", ttls.projects),
                services: env_or("CACHE_TTL_SERVICES", ttls.services),
                team: env_or("CACHE_TTL_TEAM", ttls.team),
                customers: env_or("CACHE_TTL_CUSTOMERS", ttls.customers),
            },
            public_rate_limit: RateLimitConfig::new(
                env_or("RATE_LIMIT_PUBLIC_MAX", defaults.public_rate_limit.max_requests),
                env_or(
                    "RATE_LIMIT_PUBLIC_INTERVAL_MS",
                    defaults.public_rate_limit.interval_ms,
                ),
            ),
            admin_rate_limit: RateLimitConfig::new(
                env_or("RATE_LIMIT_ADMIN_MAX", defaults.admin_rate_limit.max_requests),
                env_or(
                    "RATE_LIMIT_ADMIN_INTERVAL_MS",
                    defaults.admin_rate_limit.interval_ms,
                ),
            ),
            content_seed_path: env_path("CONTENT_SEED_PATH"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 60,
            enable_caching: true,
            cache_dir: None,
            cache_ttls: CacheTtls::default(),
            public_rate_limit: RateLimitConfig::api(),
            admin_rate_limit: RateLimitConfig::upload(),
            content_seed_path: None,
        }
    }
}

// == Helpers ==
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
