//! Audit log repository and Postgres-backed audit sink.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use parley_core::error::{AppError, ErrorKind};
use parley_core::result::AppResult;
use parley_core::traits::{AuditEvent, AuditSink};
use parley_core::types::pagination::{PageRequest, PageResponse};
use parley_entity::audit::AuditLogEntry;

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an audit log entry.
    pub async fn create(&self, event: &AuditEvent) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_log (actor_id, action, entity_type, entity_id, before, after, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(event.actor_id)
        .bind(event.action.as_str())
        .bind(&event.entity_type)
        .bind(&event.entity_id)
        .bind(&event.before)
        .bind(&event.after)
        .bind(&event.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create audit entry", e))
    }

    /// Search the audit log with optional filters, newest first.
    pub async fn search(
        &self,
        actor_id: Option<Uuid>,
        action: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_log \
             WHERE ($1::uuid IS NULL OR actor_id = $1) AND ($2::text IS NULL OR action = $2)",
        )
        .bind(actor_id)
        .bind(action)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
        })?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log \
             WHERE ($1::uuid IS NULL OR actor_id = $1) AND ($2::text IS NULL OR action = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(actor_id)
        .bind(action)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to search audit log", e)
        })?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}

#[async_trait]
impl AuditSink for AuditLogRepository {
    /// Best-effort append: a failed write is logged and swallowed so the
    /// primary operation is never aborted by its audit trail.
    async fn append(&self, event: AuditEvent) {
        if let Err(e) = self.create(&event).await {
            error!(
                action = %event.action,
                error = %e,
                "Failed to write audit record"
            );
        }
    }
}
