//! Chat message repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use parley_core::error::{AppError, ErrorKind};
use parley_core::result::AppResult;
use parley_entity::message::ChatMessage;

/// Repository for chat messages.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new message.
    pub async fn create(&self, sender_id: Uuid, content: &str) -> AppResult<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO messages (sender_id, content) VALUES ($1, $2) RETURNING *",
        )
        .bind(sender_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))
    }

    /// Find a non-deleted message by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM messages WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find message", e))
    }

    /// Replace a message's content.
    pub async fn update_content(&self, id: Uuid, content: &str) -> AppResult<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            "UPDATE messages SET content = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update message", e))?
        .ok_or_else(|| AppError::not_found(format!("Message {id} not found")))
    }

    /// Soft-delete a message. Returns `true` if a row was affected.
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE messages SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete message", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// List the most recent non-deleted messages, newest first.
    pub async fn list_recent(&self, limit: i64) -> AppResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM messages WHERE deleted_at IS NULL \
             ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list messages", e))
    }
}
