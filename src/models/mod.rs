//! Response models for the HTTP API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{
    CacheStatsResponse, ContentWriteResponse, HealthResponse, InvalidateResponse,
    RateLimitStatsResponse,
};
