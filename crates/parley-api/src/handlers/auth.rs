//! Auth handlers — register, login, refresh, logout.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use parley_core::error::AppError;

use crate::dto::request::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, StatusResponse, TokenResponse, UserResponse};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let user = state
        .session_manager
        .register(&req.username, &req.password, req.avatar_url.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(user))),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let session = state
        .session_manager
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(ApiResponse::ok(TokenResponse {
        access_token: session.tokens.access_token,
        refresh_token: session.tokens.refresh_token,
        access_expires_at: session.tokens.access_expires_at,
        refresh_expires_at: session.tokens.refresh_expires_at,
        user: UserResponse::from(session.user),
    })))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let session = state
        .session_manager
        .refresh(req.refresh_token.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok(TokenResponse {
        access_token: session.tokens.access_token,
        refresh_token: session.tokens.refresh_token,
        access_expires_at: session.tokens.access_expires_at,
        refresh_expires_at: session.tokens.refresh_expires_at,
        user: UserResponse::from(session.user),
    })))
}

/// POST /api/auth/logout
///
/// Always succeeds: a missing or malformed body, or an unrecognized or
/// already-revoked token, is a silent no-op.
pub async fn logout(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> Json<ApiResponse<StatusResponse>> {
    let token = serde_json::from_slice::<LogoutRequest>(&body)
        .ok()
        .and_then(|req| req.refresh_token);
    state.session_manager.logout(token.as_deref()).await;

    Json(ApiResponse::ok(StatusResponse {
        message: "Logged out".to_string(),
    }))
}
