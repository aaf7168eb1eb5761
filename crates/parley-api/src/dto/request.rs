//! Request DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_entity::user::UserRole;

/// Registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Avatar reference (optional).
    pub avatar_url: Option<String>,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Refresh request. The token field is optional so an absent token can be
/// reported through the uniform failure path rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token to consume.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Logout request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// The refresh token to revoke.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Admin role-change request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRoleRequest {
    /// The new role.
    pub role: UserRole,
}

/// Message creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    /// Message text.
    pub content: String,
}

/// Message edit request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMessageRequest {
    /// Replacement text.
    pub content: String,
}

/// Query parameters for the admin audit listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Filter by actor.
    pub actor_id: Option<Uuid>,
    /// Filter by action tag.
    pub action: Option<String>,
}
