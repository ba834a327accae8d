#![allow(dead_code)]

use auth_service::api::{create_router, AppState};
use auth_service::AppConfig;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = Some(TEST_SECRET.to_string());
    config.auth.hash_memory_kib = 64;
    config.auth.hash_iterations = 1;
    config.auth.hash_parallelism = 1;
    config
}

pub async fn test_state() -> AppState {
    auth_service::create_app_state(&test_config())
        .await
        .expect("state")
}

pub async fn test_app() -> Router {
    let config = test_config();
    create_router(test_state().await, &config.cors)
}

pub fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn credentials(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("response")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Register then log in, returning the issued token
pub async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let response = send(app, json_post("/api/register", credentials(username, password))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(app, json_post("/api/login", credentials(username, password))).await;
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await["token"]
        .as_str()
        .expect("token")
        .to_string()
}
