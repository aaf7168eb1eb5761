//! Chat message handlers.
//!
//! Message mutations are collaborators of the realtime core: each one is
//! audited and fanned out to every connected client through the gateway.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use parley_core::error::AppError;
use parley_core::traits::{AuditAction, AuditEvent};
use parley_entity::message::ChatMessage;

use crate::dto::request::{CreateMessageRequest, UpdateMessageRequest};
use crate::dto::response::{ApiResponse, StatusResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Maximum message length in characters.
const MAX_MESSAGE_LENGTH: usize = 2000;

/// Default and maximum sizes for the recent-message listing.
const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

/// Query parameters for listing recent messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMessagesQuery {
    /// Maximum number of messages to return.
    pub limit: Option<i64>,
}

fn validate_content(content: &str) -> Result<(), AppError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Message content must not be empty"));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::validation(format!(
            "Message content must be at most {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Owner-or-admin guard for message mutation.
fn check_ownership(message: &ChatMessage, auth: &AuthUser) -> Result<(), AppError> {
    if message.sender_id == auth.user_id || auth.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::authorization(
            "Only the sender or an administrator may modify this message",
        ))
    }
}

/// GET /api/messages
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let messages = state.message_repo.list_recent(limit).await?;
    Ok(Json(ApiResponse::ok(messages)))
}

/// POST /api/messages
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChatMessage>>), AppError> {
    validate_content(&req.content)?;

    let message = state
        .message_repo
        .create(auth.user_id, req.content.trim())
        .await?;

    state
        .audit
        .append(
            AuditEvent::new(Some(auth.user_id), AuditAction::MessageCreated, "message")
                .entity_id(message.id)
                .after(serde_json::json!({ "content": message.content })),
        )
        .await;

    state.gateway.broadcast_message_created(&message);

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}

/// PUT /api/messages/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<Json<ApiResponse<ChatMessage>>, AppError> {
    validate_content(&req.content)?;

    let existing = state
        .message_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Message {id} not found")))?;
    check_ownership(&existing, &auth)?;

    let updated = state
        .message_repo
        .update_content(id, req.content.trim())
        .await?;

    state
        .audit
        .append(
            AuditEvent::new(Some(auth.user_id), AuditAction::MessageUpdated, "message")
                .entity_id(id)
                .before(serde_json::json!({ "content": existing.content }))
                .after(serde_json::json!({ "content": updated.content })),
        )
        .await;

    state.gateway.broadcast_message_updated(&updated);

    Ok(Json(ApiResponse::ok(updated)))
}

/// DELETE /api/messages/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StatusResponse>>, AppError> {
    let existing = state
        .message_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Message {id} not found")))?;
    check_ownership(&existing, &auth)?;

    state.message_repo.soft_delete(id).await?;

    state
        .audit
        .append(
            AuditEvent::new(Some(auth.user_id), AuditAction::MessageDeleted, "message")
                .entity_id(id)
                .before(serde_json::json!({ "content": existing.content })),
        )
        .await;

    state.gateway.broadcast_message_deleted(id);

    Ok(Json(ApiResponse::ok(StatusResponse {
        message: "Message deleted".to_string(),
    })))
}
