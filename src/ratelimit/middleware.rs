//! Rate Limit Middleware
//!
//! Axum middleware that consults the limiter before a handler runs and
//! reports the outcome through `X-RateLimit-*` headers.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::ratelimit::{client_identifier, RateLimitConfig, RateLimitDecision, RateLimiter};

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

// == Route Limit ==
/// Middleware state: the shared limiter plus the limits of one route group.
#[derive(Debug, Clone)]
pub struct RouteLimit {
    pub limiter: Arc<RateLimiter>,
    pub config: RateLimitConfig,
}

impl RouteLimit {
    pub fn new(limiter: Arc<RateLimiter>, config: RateLimitConfig) -> Self {
        Self { limiter, config }
    }
}

// == Middleware ==
/// Throttles requests per client and request path.
///
/// Install with `axum::middleware::from_fn_with_state(route_limit, rate_limit)`.
pub async fn rate_limit(
    State(route_limit): State<RouteLimit>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_identifier(request.headers());
    let route = request.uri().path().to_string();
    let config = route_limit.config;

    match route_limit
        .limiter
        .check_and_record(&client, &route, &config)
    {
        RateLimitDecision::Allowed {
            remaining,
            reset_seconds,
        } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            insert_limit_headers(headers, config.max_requests, remaining, reset_seconds);
            response
        }
        RateLimitDecision::Rejected {
            retry_after_seconds,
        } => {
            warn!(
                "Rate limit exceeded for {} on {} (retry in {}s)",
                client, route, retry_after_seconds
            );
            too_many_requests(config.max_requests, retry_after_seconds)
        }
    }
}

/// Builds the 429 response for a rejected request.
pub fn too_many_requests(limit: u32, retry_after_seconds: u64) -> Response {
    let body = Json(json!({
        "error": "Too many requests, please try again later",
        "retryAfter": retry_after_seconds,
    }));

    let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_seconds));
    insert_limit_headers(headers, limit, 0, retry_after_seconds);
    response
}

fn insert_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_seconds: u64) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_seconds));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use axum::http::Request;
    use axum::{body::Body, middleware::from_fn_with_state, routing::post, Router};
    use tower::util::ServiceExt;

    fn login_app(limiter: Arc<RateLimiter>) -> Router {
        Router::new()
            .route("/api/auth/login", post(|| async { StatusCode::UNAUTHORIZED }))
            .route_layer(from_fn_with_state(
                RouteLimit::new(limiter, RateLimitConfig::login()),
                rate_limit,
            ))
    }

    fn login_request(ip: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_scenario_over_http() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = Arc::new(RateLimiter::new(clock.clone()));
        let app = login_app(limiter);

        for attempt in 0..5u32 {
            clock.advance(10_000);
            let response = app.clone().oneshot(login_request("1.2.3.4")).await.unwrap();
            // Failed credentials still pass through the limiter
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(response.headers()["x-ratelimit-limit"], "5");
            assert_eq!(
                response.headers()["x-ratelimit-remaining"],
                (4 - attempt).to_string().as_str()
            );
        }

        let response = app.clone().oneshot(login_request("1.2.3.4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["retry-after"], "860");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");

        // Another client is unaffected
        let response = app.oneshot(login_request("9.9.9.9")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_too_many_requests_body() {
        let response = too_many_requests(5, 42);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["retryAfter"], 42);
        assert!(json["error"].as_str().unwrap().contains("Too many requests"));
    }
}
