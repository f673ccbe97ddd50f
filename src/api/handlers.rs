//! API Handlers
//!
//! HTTP request handlers for public content reads, admin content writes and
//! cache / rate limit diagnostics.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::{CacheStore, FileBackend, MemoryBackend};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::content::{Collection, ContentStore};
use crate::error::{AppError, Result};
use crate::models::{
    CacheStatsResponse, ContentWriteResponse, HealthResponse, InvalidateResponse,
    RateLimitStatsResponse,
};
use crate::ratelimit::RateLimiter;

/// Cache key of the per-collection document counts.
pub const SUMMARY_KEY: &str = "content:summary";

/// Cache key of a collection listing.
pub fn list_key(collection: Collection) -> String {
    format!("{collection}:list")
}

/// Cache key of a single document. Kept under `doc:` so no document id can
/// land on the listing key.
pub fn document_key(collection: Collection, id: &str) -> String {
    format!("{collection}:doc:{id}")
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Response cache
    pub cache: Arc<CacheStore>,
    /// Request counters
    pub limiter: Arc<RateLimiter>,
    /// Site content
    pub content: Arc<ContentStore>,
    /// TTLs and rate limits
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        cache: CacheStore,
        limiter: RateLimiter,
        content: ContentStore,
        config: Config,
    ) -> Self {
        Self {
            cache: Arc::new(cache),
            limiter: Arc::new(limiter),
            content: Arc::new(content),
            config: Arc::new(config),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Picks the file backend when `cache_dir` is set and loads the content
    /// seed file if one is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let cache = match &config.cache_dir {
            Some(dir) => {
                info!("Using file-backed cache at {}", dir.display());
                CacheStore::new(FileBackend::new(dir), clock.clone())
            }
            None => {
                info!("Using in-memory cache");
                CacheStore::new(MemoryBackend::new(), clock.clone())
            }
        }
        .with_enabled(config.enable_caching);

        let content = match &config.content_seed_path {
            Some(path) => ContentStore::load_seed_file(path)?,
            None => ContentStore::new(),
        };

        Ok(Self::new(
            cache,
            RateLimiter::new(clock),
            content,
            config.clone(),
        ))
    }

    /// Drops every cached response derived from `collection`.
    fn invalidate_collection(&self, collection: Collection) -> usize {
        let removed = self.cache.delete_pattern(&format!("{collection}:"));
        self.cache.delete(SUMMARY_KEY);
        info!("Invalidated {} cache entries for {}", removed, collection);
        removed
    }
}

/// Handler for GET /api/content
///
/// Returns the number of documents in each collection.
pub async fn summary_handler(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<Collection, usize>>> {
    let content = state.content.clone();
    let counts = state
        .cache
        .with_cache(
            SUMMARY_KEY,
            move || async move { Ok::<_, AppError>(content.counts().await) },
            state.config.cache_ttls.default,
        )
        .await?;

    Ok(Json(counts))
}

/// Handler for GET /api/content/:collection
///
/// Lists a collection through the cache.
pub async fn list_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Json<Vec<Value>>> {
    let collection: Collection = collection.parse()?;
    let content = state.content.clone();

    let documents = state
        .cache
        .with_cache(
            &list_key(collection),
            move || async move { Ok::<_, AppError>(content.list(collection).await) },
            state.config.cache_ttls.for_collection(collection),
        )
        .await?;

    Ok(Json(documents))
}

/// Handler for GET /api/content/:collection/:id
///
/// Fetches one document through the cache. Missing documents are not cached.
pub async fn document_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let collection: Collection = collection.parse()?;
    let content = state.content.clone();
    let key = document_key(collection, &id);

    let document = state
        .cache
        .with_cache(
            &key,
            move || async move { content.get(collection, &id).await },
            state.config.cache_ttls.for_collection(collection),
        )
        .await?;

    Ok(Json(document))
}

/// Handler for PUT /api/admin/content/:collection
///
/// Saves a document and invalidates the collection's cached responses.
pub async fn upsert_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(document): Json<Value>,
) -> Result<Json<ContentWriteResponse>> {
    let collection: Collection = collection.parse()?;
    let id = state.content.upsert(collection, document).await?;
    let invalidated = state.invalidate_collection(collection);

    Ok(Json(ContentWriteResponse::saved(collection, id, invalidated)))
}

/// Handler for DELETE /api/admin/content/:collection/:id
///
/// Removes a document and invalidates the collection's cached responses.
pub async fn delete_document_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<ContentWriteResponse>> {
    let collection: Collection = collection.parse()?;
    state.content.delete(collection, &id).await?;
    let invalidated = state.invalidate_collection(collection);

    Ok(Json(ContentWriteResponse::deleted(collection, id, invalidated)))
}

/// Handler for GET /api/admin/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.cache.stats();
    Json(CacheStatsResponse::new(state.cache.is_enabled(), &stats))
}

/// Handler for DELETE /api/admin/cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let removed = state.cache.clear();
    info!("Cache cleared: {} entries removed", removed);
    Json(InvalidateResponse::new("Cache cleared", removed))
}

/// Handler for DELETE /api/admin/cache/pattern/:pattern
pub async fn delete_pattern_handler(
    State(state): State<AppState>,
    Path(pattern): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    if pattern.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Pattern cannot be empty".to_string(),
        ));
    }

    let removed = state.cache.delete_pattern(&pattern);
    info!("Cache pattern '{}' invalidated: {} entries", pattern, removed);
    Ok(Json(InvalidateResponse::new(
        format!("Entries matching '{}' invalidated", pattern),
        removed,
    )))
}

/// Handler for DELETE /api/admin/cache/key/:key
pub async fn delete_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = usize::from(state.cache.delete(&key));
    Json(InvalidateResponse::new(
        format!("Key '{}' invalidated", key),
        removed,
    ))
}

/// Handler for GET /api/admin/rate-limit/stats
pub async fn rate_limit_stats_handler(
    State(state): State<AppState>,
) -> Json<RateLimitStatsResponse> {
    Json(RateLimitStatsResponse {
        active_windows: state.limiter.active_windows(),
    })
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    fn test_state() -> (Arc<ManualClock>, AppState) {
        let clock = Arc::new(ManualClock::new(0));
        let state = AppState::new(
            CacheStore::new(MemoryBackend::new(), clock.clone()),
            RateLimiter::new(clock.clone()),
            ContentStore::new(),
            Config::default(),
        );
        (clock, state)
    }

    async fn seed(state: &AppState, collection: &str, doc: Value) {
        upsert_handler(
            State(state.clone()),
            Path(collection.to_string()),
            Json(doc),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_list_is_served_from_cache_until_invalidated() {
        let (_clock, state) = test_state();
        seed(&state, "projects", json!({"id": "alpha"})).await;

        let first = list_handler(State(state.clone()), Path("projects".to_string()))
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        // Bypass the handlers so the cache is not invalidated
        state
            .content
            .upsert(Collection::Projects, json!({"id": "beta"}))
            .await
            .unwrap();
        let cached = list_handler(State(state.clone()), Path("projects".to_string()))
            .await
            .unwrap();
        assert_eq!(cached.len(), 1);

        // A write through the admin handler drops the stale list
        seed(&state, "projects", json!({"id": "gamma"})).await;
        let fresh = list_handler(State(state.clone()), Path("projects".to_string()))
            .await
            .unwrap();
        assert_eq!(fresh.len(), 3);
    }

    #[tokio::test]
    async fn test_list_expires_with_collection_ttl() {
        let (clock, state) = test_state();
        seed(&state, "team", json!({"id": "ana"})).await;
        list_handler(State(state.clone()), Path("team".to_string()))
            .await
            .unwrap();

        state
            .content
            .upsert(Collection::Team, json!({"id": "bo"}))
            .await
            .unwrap();
        clock.advance(state.config.cache_ttls.team * 1000 + 1);

        let fresh = list_handler(State(state.clone()), Path("team".to_string()))
            .await
            .unwrap();
        assert_eq!(fresh.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_document_is_not_cached() {
        let (_clock, state) = test_state();

        let result = document_handler(
            State(state.clone()),
            Path(("pages".to_string(), "about".to_string())),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(state.cache.stats().total_entries, 0);
    }

    #[tokio::test]
    async fn test_unknown_collection() {
        let (_clock, state) = test_state();

        let result = list_handler(State(state), Path("blog".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_write_invalidates_only_its_collection() {
        let (_clock, state) = test_state();
        seed(&state, "projects", json!({"id": "alpha"})).await;
        seed(&state, "team", json!({"id": "ana"})).await;

        list_handler(State(state.clone()), Path("projects".to_string()))
            .await
            .unwrap();
        list_handler(State(state.clone()), Path("team".to_string()))
            .await
            .unwrap();
        document_handler(
            State(state.clone()),
            Path(("projects".to_string(), "alpha".to_string())),
        )
        .await
        .unwrap();
        summary_handler(State(state.clone())).await.unwrap();
        assert_eq!(state.cache.stats().total_entries, 4);

        let response = delete_document_handler(
            State(state.clone()),
            Path(("projects".to_string(), "alpha".to_string())),
        )
        .await
        .unwrap();
        assert_eq!(response.invalidated, 2);

        // Only the team list survives
        assert_eq!(state.cache.stats().total_entries, 1);
        assert!(state.cache.get(&list_key(Collection::Team)).is_some());
    }

    #[tokio::test]
    async fn test_document_id_cannot_hit_cached_list() {
        let (_clock, state) = test_state();
        seed(&state, "projects", json!({"id": "alpha"})).await;
        list_handler(State(state.clone()), Path("projects".to_string()))
            .await
            .unwrap();

        for id in ["all", "list"] {
            let result = document_handler(
                State(state.clone()),
                Path(("projects".to_string(), id.to_string())),
            )
            .await;
            assert!(matches!(result, Err(AppError::NotFound(_))), "id {id}");
        }
    }

    #[tokio::test]
    async fn test_document_named_list_keeps_listing_intact() {
        let (_clock, state) = test_state();
        seed(&state, "pages", json!({"id": "list", "title": "Index"})).await;

        let document = document_handler(
            State(state.clone()),
            Path(("pages".to_string(), "list".to_string())),
        )
        .await
        .unwrap();
        assert_eq!(document["title"], "Index");

        let pages = list_handler(State(state.clone()), Path("pages".to_string()))
            .await
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(state.cache.stats().total_entries, 2);
        assert_eq!(state.cache.stats().hits, 0);
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let (_clock, state) = test_state();
        seed(&state, "services", json!({"id": "seo"})).await;
        seed(&state, "services", json!({"id": "ads"})).await;

        let counts = summary_handler(State(state)).await.unwrap();
        assert_eq!(counts[&Collection::Services], 2);
        assert_eq!(counts[&Collection::Customers], 0);
    }

    #[tokio::test]
    async fn test_cache_admin_handlers() {
        let (_clock, state) = test_state();
        state.cache.set("projects:all", &json!([]), 60);
        state.cache.set("projects:featured", &json!([]), 60);
        state.cache.set("team:all", &json!([]), 60);

        let response = delete_pattern_handler(State(state.clone()), Path("projects".to_string()))
            .await
            .unwrap();
        assert_eq!(response.removed, 2);

        let response = delete_key_handler(State(state.clone()), Path("team:all".to_string())).await;
        assert_eq!(response.removed, 1);

        state.cache.set("pages:all", &json!([]), 60);
        let stats = cache_stats_handler(State(state.clone())).await;
        assert_eq!(stats.total_entries, 1);
        assert!(stats.enabled);

        let response = clear_cache_handler(State(state.clone())).await;
        assert_eq!(response.removed, 1);
    }

    #[tokio::test]
    async fn test_empty_pattern_rejected() {
        let (_clock, state) = test_state();

        let result = delete_pattern_handler(State(state), Path(" ".to_string())).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_caching_disabled_reads_through() {
        let clock = Arc::new(ManualClock::new(0));
        let state = AppState::new(
            CacheStore::new(MemoryBackend::new(), clock.clone()).with_enabled(false),
            RateLimiter::new(clock),
            ContentStore::new(),
            Config::default(),
        );
        seed(&state, "pages", json!({"id": "home"})).await;
        list_handler(State(state.clone()), Path("pages".to_string()))
            .await
            .unwrap();

        state
            .content
            .upsert(Collection::Pages, json!({"id": "about"}))
            .await
            .unwrap();
        let pages = list_handler(State(state.clone()), Path("pages".to_string()))
            .await
            .unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(state.cache.stats().total_entries, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
