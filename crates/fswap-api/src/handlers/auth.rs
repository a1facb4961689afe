//! Login and session handlers.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{bearer_token, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if !state.users.verify(&request.username, &request.password) {
        // One message for both unknown user and wrong password.
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let token = state.sessions.login(request.username.clone()).await;
    info!(username = %request.username, "User logged in");

    Ok(Json(LoginResponse {
        token,
        username: request.username,
    }))
}

/// POST /api/auth/logout
///
/// Idempotent: logging out an unknown token still succeeds.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<LogoutResponse>> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing or malformed Authorization header"))?;

    if state.sessions.logout(token).await {
        info!("User logged out");
    }

    Ok(Json(LogoutResponse {
        status: "logged_out".to_string(),
    }))
}

/// GET /api/auth/me
pub async fn current_user(user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        username: user.username,
    })
}
