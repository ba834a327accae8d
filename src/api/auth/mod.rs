//! Credential endpoints
//!
//! Registration, login, logout and the session-gated profile lookup. Login
//! returns the token in the body and sets it as an `HttpOnly` cookie, so both
//! browser and API clients can authenticate later requests.

mod cookie;

pub use cookie::SessionCookie;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    middleware,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{require_session, Authenticated};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::UserId;

/// Create the authentication router
pub fn create_auth_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(state, require_session));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(protected)
}

/// Body of register and login requests
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub id: UserId,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: UserId,
    pub username: String,
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .auth_service
        .register(&request.username, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            id,
        }),
    ))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let issued = state
        .auth_service
        .login(&request.username, &request.password)
        .await?;

    let set_cookie = state.session_cookie.issue(&issued.token);

    Ok((
        AppendHeaders([(SET_COOKIE, set_cookie)]),
        Json(LoginResponse {
            message: "Login successful",
            token: issued.token,
            expires_at: issued.expires_at.to_rfc3339(),
        }),
    ))
}

/// POST /api/logout
///
/// Tokens are stateless; this only removes the cookie from the browser.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, state.session_cookie.clear())]),
    )
}

/// GET /api/profile
pub async fn profile(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state.auth_service.profile(&identity).await?;

    Ok(Json(ProfileResponse {
        id: user.id(),
        username: user.username().to_string(),
    }))
}
