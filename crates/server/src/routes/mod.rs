//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                   - Liveness
//! GET    /health/ready                             - Readiness (database ping)
//!
//! # Farms
//! GET    /api/farms                                - Caller's farms (auth)
//! POST   /api/farms                                - Register a farm (auth)
//! GET    /api/farms/{id}                           - Farm profile
//! PATCH  /api/farms/{id}                           - Basic info and list updates (owner)
//! DELETE /api/farms/{id}                           - Delete (owner)
//!
//! # Stores
//! GET    /api/stores                               - Caller's stores (auth)
//! POST   /api/stores                               - Register a store (auth)
//! GET    /api/stores/{id}                          - Store profile
//! PATCH  /api/stores/{id}                          - One operation envelope (owner)
//! DELETE /api/stores/{id}                          - Delete (owner)
//!
//! # Wishlist (guest or persisted)
//! GET    /api/wishlist                             - Items and summary
//! DELETE /api/wishlist                             - Clear
//! GET    /api/wishlist/summary                     - Counts
//! POST   /api/wishlist/items                       - Add an item
//! GET    /api/wishlist/items/{itemType}/{itemId}   - Membership check
//! PATCH  /api/wishlist/items/{itemType}/{itemId}   - Replace notes
//! DELETE /api/wishlist/items/{itemType}/{itemId}   - Remove
//! ```

pub mod farms;
pub mod health;
pub mod stores;
pub mod wishlist;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::middleware::{request_id_middleware, wishlist_merge_middleware};
use crate::state::AppState;

/// All API routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(farms::router())
        .merge(stores::router())
        .merge(wishlist::router())
}

/// Build the application router with its middleware stack.
///
/// Sentry layers are added by the caller, outside this stack.
pub fn build_router<Store>(state: AppState, session_layer: SessionManagerLayer<Store>) -> Router
where
    Store: SessionStore + Clone,
{
    routes()
        .layer(from_fn_with_state(state.clone(), wishlist_merge_middleware))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::{DEFAULT_MAX_WISHLIST_ITEMS, ServerConfig};

    /// A router whose pool never connects; only routes that stay off the
    /// database are exercised here.
    fn test_router() -> Router {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://market@localhost/market"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".parse().unwrap(),
            db_max_connections: 1,
            max_wishlist_items: DEFAULT_MAX_WISHLIST_ITEMS,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://market@localhost/market")
            .unwrap();
        let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);
        build_router(AppState::new(config, pool), session_layer)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = test_router()
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn test_farm_update_requires_sign_in() {
        let response = test_router()
            .oneshot(
                Request::patch("/api/farms/1")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"basicInfo":{"farmName":"Sunrise"}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "Sign in required");
    }

    #[tokio::test]
    async fn test_store_delete_requires_sign_in() {
        let response = test_router()
            .oneshot(Request::delete("/api/stores/3").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_anonymous_summary_is_empty() {
        let response = test_router()
            .oneshot(
                Request::get("/api/wishlist/summary")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"totalItems": 0, "farmProducts": 0, "storeProducts": 0})
        );
    }

    #[tokio::test]
    async fn test_guest_add_item_is_created() {
        let response = test_router()
            .oneshot(
                Request::post("/api/wishlist/items")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "itemId": "tomato-crate",
                            "itemType": "FarmProduct",
                            "name": "Tomatoes",
                            "price": "4500",
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        let body = json_body(response).await;
        assert_eq!(body["itemId"], "tomato-crate");
        assert_eq!(body["inStock"], true);
    }

    #[tokio::test]
    async fn test_unknown_item_type_is_bad_request() {
        let response = test_router()
            .oneshot(
                Request::get("/api/wishlist/items/Vegetable/tomato-crate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = test_router()
            .oneshot(
                Request::post("/api/wishlist/items")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }
}
