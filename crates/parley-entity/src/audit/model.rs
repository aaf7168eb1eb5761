//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable audit log entry recording a user action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The user who performed the action; null for anonymous/failed attempts.
    pub actor_id: Option<Uuid>,
    /// The action tag (e.g. `"AUTH_LOGIN_SUCCESS"`, `"MESSAGE_DELETED"`).
    pub action: String,
    /// The type of target entity (e.g. `"user"`, `"message"`).
    pub entity_type: String,
    /// The target entity ID (if applicable).
    pub entity_id: Option<String>,
    /// Snapshot of the entity before the action (JSON).
    pub before: Option<serde_json::Value>,
    /// Snapshot of the entity after the action (JSON).
    pub after: Option<serde_json::Value>,
    /// Free-form metadata (JSON).
    pub metadata: Option<serde_json::Value>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}
