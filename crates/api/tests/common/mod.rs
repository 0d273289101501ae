//! Shared helpers for HTTP-level integration tests.
//!
//! `build_test_app` assembles the same router and middleware stack as the
//! production binary, backed by the per-test database pool that
//! `#[sqlx::test]` provides. Requests are driven through the router
//! in-process with `tower::ServiceExt::oneshot`; no sockets involved.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use sonnet_api::auth::jwt::JwtConfig;
use sonnet_api::config::ServerConfig;
use sonnet_api::router::build_app_router;
use sonnet_api::state::AppState;
use sonnet_api::ws::ChannelHub;

/// Deterministic configuration for tests; no environment variables read.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 5,
        muse_api_url: "http://localhost:8700".to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router on top of a test database pool.
pub async fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        channel_hub: Arc::new(ChannelHub::new()),
        event_bus: Arc::new(sonnet_events::EventBus::default()),
        muse: Arc::new(sonnet_muse::MuseClient::new(config.muse_api_url.clone())),
    };
    build_app_router(state, &config)
}

/// Send a GET request without authentication.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body, without authentication.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body and a Bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    request_json_auth(app, "POST", uri, body, token).await
}

/// Send a PUT request with a JSON body and a Bearer token.
pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    request_json_auth(app, "PUT", uri, body, token).await
}

/// Send a DELETE request with a Bearer token (no body).
pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a DELETE request with a JSON body and a Bearer token.
pub async fn delete_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    request_json_auth(app, "DELETE", uri, body, token).await
}

async fn request_json_auth(
    app: Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Register a user through the API and return `(user_id, access_token)`.
pub async fn register_user(app: Router, username: &str) -> (i64, String) {
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "username": username,
            "email": format!("{username}@test.com"),
            "password": "test_password_123!",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let user_id = json["user"]["id"].as_i64().expect("user id");
    let token = json["access_token"].as_str().expect("access token");
    (user_id, token.to_string())
}

/// A structurally valid 10x14 poems array for request bodies.
pub fn full_poems_json() -> serde_json::Value {
    let poems: Vec<serde_json::Value> = (0..10)
        .map(|p| {
            serde_json::json!({
                "lines": (0..14).map(|l| format!("poem {p} line {l}")).collect::<Vec<_>>()
            })
        })
        .collect();
    serde_json::Value::Array(poems)
}
