//! Axum router construction.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{middleware::map_response, routing::get, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{
    handlers,
    middleware::{self, ClientIpKeyExtractor, HttpPolicy},
    state::AppState,
};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// # Errors
///
/// Returns an error if the rate limit allows no requests at all.
pub fn build(state: AppState, policy: &HttpPolicy) -> Result<Router> {
    let cors = middleware::cors(policy, state.user_header.clone());
    let governor = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .period(policy.rate_limit.replenish_period())
        .burst_size(policy.rate_limit.max_requests)
        .finish()
        .context("rate limit must allow at least one request per window")?;

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route("/api/items/stats/dashboard", get(handlers::dashboard))
        .route(
            "/api/items/:id",
            get(handlers::get_item)
                .patch(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/api/items/:id/secret", get(handlers::get_secret))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(policy.request_timeout))
        .layer(GovernorLayer {
            config: Arc::new(governor),
        })
        .layer(map_response(middleware::rate_limit_body))
        .layer(CompressionLayer::new());

    let router = middleware::security_headers()
        .into_iter()
        .fold(router, |router, layer| router.layer(layer));

    Ok(router.layer(cors).with_state(state))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderName, Method, Request},
    };
    use common::protocol::ErrorResponse;
    use tower::ServiceExt;

    use crate::server::middleware::{RateLimit, SECURITY_HEADERS};
    use crate::crypto::{generate_key, EncryptionKey, SecretCipher};
    use crate::items::{ItemService, ItemStore};

    fn app() -> Router {
        let key = EncryptionKey::from_base64(Some(&generate_key())).unwrap();
        let items = ItemService::new(ItemStore::new(), SecretCipher::new(&key));
        let state = AppState::new(items, HeaderName::from_static("x-user-id"));
        build(state, &HttpPolicy::default()).unwrap()
    }

    fn limited_app(max_requests: u32) -> Router {
        let key = EncryptionKey::from_base64(Some(&generate_key())).unwrap();
        let items = ItemService::new(ItemStore::new(), SecretCipher::new(&key));
        let state = AppState::new(items, HeaderName::from_static("x-user-id"));
        let policy = HttpPolicy {
            rate_limit: RateLimit {
                max_requests,
                window: Duration::from_secs(900),
            },
            ..HttpPolicy::default()
        };
        build(state, &policy).unwrap()
    }

    fn list_request(client: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/items")
            .header("x-user-id", "alice")
            .header("x-forwarded-for", client)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn health_route_exists() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn dashboard_route_is_not_an_item_id() {
        let req = Request::builder()
            .uri("/api/items/stats/dashboard")
            .header("x-user-id", "alice")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn cors_preflight_allows_frontend() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/items")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn requests_over_budget_are_rejected_with_429() {
        let app = limited_app(3);
        for _ in 0..3 {
            let resp = app.clone().oneshot(list_request("198.51.100.1")).await.unwrap();
            assert_eq!(resp.status(), 200);
        }

        let resp = app.clone().oneshot(list_request("198.51.100.1")).await.unwrap();
        assert_eq!(resp.status(), 429);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.code, "rate_limited");

        // Budgets are per client.
        let resp = app.oneshot(list_request("198.51.100.2")).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(resp.headers()[name], value, "{name}");
        }
    }

    #[tokio::test]
    async fn error_responses_carry_security_headers() {
        let req = Request::builder()
            .uri("/api/items")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 401);
        assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    }
}
