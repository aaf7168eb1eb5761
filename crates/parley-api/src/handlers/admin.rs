//! Admin handlers — account management and audit search.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use parley_core::error::AppError;
use parley_core::types::pagination::PageResponse;
use parley_entity::audit::AuditLogEntry;

use crate::dto::request::{AuditQuery, ChangeRoleRequest};
use crate::dto::response::{ApiResponse, StatusResponse, UserResponse};
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<UserResponse>>>, AppError> {
    auth.require_admin()?;

    let page = state
        .credential_store
        .list_users(&pagination.into_page_request())
        .await?;

    let users = PageResponse::new(
        page.items.into_iter().map(UserResponse::from).collect(),
        page.page,
        page.page_size,
        page.total,
    );

    Ok(Json(ApiResponse::ok(users)))
}

/// PUT /api/admin/users/{id}/role
pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state
        .session_manager
        .change_role(auth.user_id, auth.role, user_id, req.role)
        .await?;

    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<StatusResponse>>, AppError> {
    state
        .session_manager
        .delete_user(auth.user_id, auth.role, user_id)
        .await?;

    Ok(Json(ApiResponse::ok(StatusResponse {
        message: "User deleted".to_string(),
    })))
}

/// GET /api/admin/audit
pub async fn list_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<AuditQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<AuditLogEntry>>>, AppError> {
    auth.require_admin()?;

    let page = state
        .audit_repo
        .search(
            filter.actor_id,
            filter.action.as_deref(),
            &pagination.into_page_request(),
        )
        .await?;

    Ok(Json(ApiResponse::ok(page)))
}
