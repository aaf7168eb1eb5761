//! Append-only audit sink boundary.
//!
//! Audit writes are an observability side effect, not a transactional
//! participant: implementations must swallow their own failures so that a
//! broken sink never aborts the operation being recorded.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known audit action tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    /// A new account was registered.
    AuthRegister,
    /// Credentials were verified and a token pair issued.
    AuthLoginSuccess,
    /// A login attempt failed (unknown username or wrong password).
    AuthLoginFailed,
    /// A refresh token was rotated successfully.
    AuthRefreshSuccess,
    /// A refresh attempt failed (reason carried in metadata).
    AuthRefreshFailed,
    /// A refresh token was revoked by an explicit logout.
    AuthLogout,
    /// An administrator changed a user's role.
    UserRoleChanged,
    /// An administrator soft-deleted a user.
    UserDeleted,
    /// A chat message was created.
    MessageCreated,
    /// A chat message was edited.
    MessageUpdated,
    /// A chat message was deleted.
    MessageDeleted,
}

impl AuditAction {
    /// The action tag as stored in the audit log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthRegister => "AUTH_REGISTER",
            Self::AuthLoginSuccess => "AUTH_LOGIN_SUCCESS",
            Self::AuthLoginFailed => "AUTH_LOGIN_FAILED",
            Self::AuthRefreshSuccess => "AUTH_REFRESH_SUCCESS",
            Self::AuthRefreshFailed => "AUTH_REFRESH_FAILED",
            Self::AuthLogout => "AUTH_LOGOUT",
            Self::UserRoleChanged => "USER_ROLE_CHANGED",
            Self::UserDeleted => "USER_DELETED",
            Self::MessageCreated => "MESSAGE_CREATED",
            Self::MessageUpdated => "MESSAGE_UPDATED",
            Self::MessageDeleted => "MESSAGE_DELETED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured audit event handed to the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The user who performed the action; `None` for anonymous/failed attempts.
    pub actor_id: Option<Uuid>,
    /// The action tag.
    pub action: AuditAction,
    /// The type of entity the action targeted (e.g. `"user"`, `"message"`).
    pub entity_type: String,
    /// The target entity ID, if applicable.
    pub entity_id: Option<String>,
    /// Snapshot of the entity before the action.
    pub before: Option<serde_json::Value>,
    /// Snapshot of the entity after the action.
    pub after: Option<serde_json::Value>,
    /// Free-form metadata (e.g. failure reasons).
    pub metadata: Option<serde_json::Value>,
}

impl AuditEvent {
    /// Create an event with no snapshots or metadata.
    pub fn new(
        actor_id: Option<Uuid>,
        action: AuditAction,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            actor_id,
            action,
            entity_type: entity_type.into(),
            entity_id: None,
            before: None,
            after: None,
            metadata: None,
        }
    }

    /// Attach the target entity ID.
    pub fn entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Attach a before-snapshot.
    pub fn before(mut self, value: serde_json::Value) -> Self {
        self.before = Some(value);
        self
    }

    /// Attach an after-snapshot.
    pub fn after(mut self, value: serde_json::Value) -> Self {
        self.after = Some(value);
        self
    }

    /// Attach free-form metadata.
    pub fn metadata(mut self, value: serde_json::Value) -> Self {
        self.metadata = Some(value);
        self
    }
}

/// Append-only sink for audit events.
///
/// `append` is fire-and-forget: it returns nothing and must never panic or
/// block the caller on sink failure.
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    /// Record an audit event, best-effort.
    async fn append(&self, event: AuditEvent);
}
