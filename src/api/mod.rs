//! API Module
//!
//! HTTP handlers and routing for the content and cache administration API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /api/content/...` - Cached, rate-limited content reads
//! - `PUT|DELETE /api/admin/content/...` - Content writes with cache invalidation
//! - `/api/admin/cache/...` - Cache statistics and invalidation
//! - `GET /api/admin/rate-limit/stats` - Rate limiter diagnostics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
