//! API Routes
//!
//! Configures the Axum router with the content, admin and health endpoints.

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, clear_cache_handler, delete_document_handler, delete_key_handler,
    delete_pattern_handler, document_handler, health_handler, list_handler,
    rate_limit_stats_handler, summary_handler, upsert_handler, AppState,
};
use crate::ratelimit::{rate_limit, RouteLimit};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /api/content` - Document counts per collection
/// - `GET /api/content/:collection` - List a collection
/// - `GET /api/content/:collection/:id` - Fetch one document
/// - `PUT /api/admin/content/:collection` - Save a document
/// - `DELETE /api/admin/content/:collection/:id` - Delete a document
/// - `GET /api/admin/cache/stats` - Cache statistics
/// - `DELETE /api/admin/cache` - Clear the cache
/// - `DELETE /api/admin/cache/pattern/:pattern` - Invalidate matching keys
/// - `DELETE /api/admin/cache/key/:key` - Invalidate one key
/// - `GET /api/admin/rate-limit/stats` - Tracked rate limit windows
///
/// # Middleware
/// - Rate limiting: public and admin routes each get their own limits
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_limit = RouteLimit::new(state.limiter.clone(), state.config.public_rate_limit);
    let admin_limit = RouteLimit::new(state.limiter.clone(), state.config.admin_rate_limit);

    let public = Router::new()
        .route("/api/content", get(summary_handler))
        .route("/api/content/:collection", get(list_handler))
        .route("/api/content/:collection/:id", get(document_handler))
        .route_layer(from_fn_with_state(public_limit, rate_limit));

    let admin = Router::new()
        .route("/api/admin/content/:collection", put(upsert_handler))
        .route(
            "/api/admin/content/:collection/:id",
            delete(delete_document_handler),
        )
        .route("/api/admin/cache", delete(clear_cache_handler))
        .route("/api/admin/cache/stats", get(cache_stats_handler))
        .route(
            "/api/admin/cache/pattern/:pattern",
            delete(delete_pattern_handler),
        )
        .route("/api/admin/cache/key/:key", delete(delete_key_handler))
        .route("/api/admin/rate-limit/stats", get(rate_limit_stats_handler))
        .route_layer(from_fn_with_state(admin_limit, rate_limit));

    Router::new()
        .route("/health", get(health_handler))
        .merge(public)
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
