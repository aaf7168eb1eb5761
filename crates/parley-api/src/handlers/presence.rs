//! Presence roster handler.

use axum::Json;
use axum::extract::State;

use parley_realtime::presence::OnlineUser;

use crate::dto::response::ApiResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/presence
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<ApiResponse<Vec<OnlineUser>>> {
    Json(ApiResponse::ok(state.gateway.presence_snapshot()))
}
