mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use common::*;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

fn profile_with_bearer(token: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/profile")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn profile_with_cookie(cookie: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/profile")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn sign(claims: Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn register_returns_created_and_rejects_duplicates() {
    let app = test_app().await;

    let response = send(&app, json_post("/api/register", credentials("alice", "pw1"))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["id"], 1);

    let response = send(&app, json_post("/api/register", credentials("alice", "other"))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Username already exists");
    assert_eq!(body["error"]["code"], "username_taken");
}

#[tokio::test]
async fn register_rejects_empty_fields() {
    let app = test_app().await;

    let response = send(&app, json_post("/api/register", credentials("", "pw"))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["type"], "invalid_request_error");

    let response = send(&app, json_post("/api/register", credentials("bob", ""))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_malformed_body() {
    let app = test_app().await;

    let response = send(&app, json_post("/api/register", json!({ "username": "bob" }))).await;
    assert!(response.status().is_client_error());
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "json_parse_error");

    let request = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_sets_session_cookie() {
    let app = test_app().await;
    send(&app, json_post("/api/register", credentials("alice", "pw1"))).await;

    let response = send(&app, json_post("/api/login", credentials("alice", "pw1"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("auth-session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=604800"));

    let body = body_json(response).await;
    assert_eq!(body["message"], "Login successful");
    let token = body["token"].as_str().unwrap();
    assert_eq!(token.split('.').count(), 3);
    assert!(cookie.contains(token));
    assert!(body["expires_at"].as_str().is_some());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_app().await;
    send(&app, json_post("/api/register", credentials("alice", "pw1"))).await;

    let wrong_password = send(&app, json_post("/api/login", credentials("alice", "nope"))).await;
    let unknown_user = send(&app, json_post("/api/login", credentials("mallory", "pw1"))).await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong_password.headers().get(header::SET_COOKIE).is_none());

    let a = body_json(wrong_password).await;
    let b = body_json(unknown_user).await;
    assert_eq!(a, b);
    assert_eq!(a["error"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn profile_with_bearer_token() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice", "pw1").await;

    let response = send(&app, profile_with_bearer(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["username"], "alice");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn profile_accepts_lowercase_bearer_scheme() {
    let app = test_app().await;
    let token = register_and_login(&app, "carol", "pw3").await;

    let request = Request::builder()
        .uri("/api/profile")
        .header(header::AUTHORIZATION, format!("bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "carol");
}

#[tokio::test]
async fn profile_via_cookie() {
    let app = test_app().await;
    let token = register_and_login(&app, "bob", "pw2").await;

    let response = send(&app, profile_with_cookie(&format!("theme=dark; auth-session={}", token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "bob");
}

#[tokio::test]
async fn profile_rejects_missing_and_invalid_tokens() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice", "pw1").await;

    let missing = Request::builder()
        .uri("/api/profile")
        .body(Body::empty())
        .unwrap();

    let (signed, signature) = token.rsplit_once('.').unwrap();
    let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{}.{}{}", signed, flipped, &signature[1..]);

    let now = Utc::now().timestamp();
    let expired = sign(
        json!({ "sub": "1", "username": "alice", "iat": now - 120, "exp": now - 60 }),
        TEST_SECRET,
    );
    let foreign_key = sign(
        json!({ "sub": "1", "username": "alice", "iat": now, "exp": now + 3600 }),
        "some-other-secret",
    );

    let mut bodies = Vec::new();
    for request in [
        missing,
        profile_with_bearer("garbage"),
        profile_with_bearer(&tampered),
        profile_with_bearer(&expired),
        profile_with_bearer(&foreign_key),
        profile_with_cookie("auth-session=garbage"),
    ] {
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(body_json(response).await);
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(bodies[0]["error"]["message"], "Unauthorized");
}

#[tokio::test]
async fn profile_of_unknown_user_is_not_found() {
    let app = test_app().await;

    let now = Utc::now().timestamp();
    let token = sign(
        json!({ "sub": "42", "username": "ghost", "iat": now, "exp": now + 3600 }),
        TEST_SECRET,
    );

    let response = send(&app, profile_with_bearer(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["message"], "User not found");
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/logout")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("auth-session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn health_and_ready() {
    let app = test_app().await;

    let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = send(&app, health).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_json(response).await["status"], "healthy");

    let ready = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let response = send(&app, ready).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["checks"][0]["name"], "credential_store");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = test_app().await;

    let request = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
