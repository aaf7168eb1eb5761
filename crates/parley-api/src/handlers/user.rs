//! User self-service handlers.

use axum::Json;
use axum::extract::State;

use parley_core::error::AppError;

use crate::dto::response::{ApiResponse, SessionResponse, UserResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state
        .credential_store
        .find_user_by_id(auth.user_id)
        .await?
        .filter(|u| !u.is_deleted())
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}

/// GET /api/users/me/sessions
///
/// Lists the caller's active refresh-token sessions (other devices/tabs).
pub async fn sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SessionResponse>>>, AppError> {
    let records = state
        .session_manager
        .active_refresh_tokens(auth.user_id)
        .await?;

    Ok(Json(ApiResponse::ok(
        records.into_iter().map(SessionResponse::from).collect(),
    )))
}
