//! Refresh-token record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted refresh-token record.
///
/// Only the Argon2 hash of the token is stored, never the plaintext. The
/// token's `jti` claim is stored separately (`token_id`, uniquely indexed)
/// so a presented token can be located without scanning hashes.
///
/// Lifecycle: `ISSUED → REVOKED` (by rotation, logout, or bulk revoke).
/// Revocation is permanent; expiry is a time-based condition checked at
/// verification time, not a stored transition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshTokenRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// The owning user.
    pub user_id: Uuid,
    /// The token's `jti` claim (plaintext, uniquely indexed).
    pub token_id: Uuid,
    /// Argon2 hash of the full token string.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// When the token was revoked, if it has been.
    pub revoked_at: Option<DateTime<Utc>>,
    /// The record that replaced this one at rotation, forming a chain.
    pub replaced_by: Option<Uuid>,
}

impl RefreshTokenRecord {
    /// Check if this record has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check if this record has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check if this record can still satisfy a refresh.
    pub fn is_active(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }
}

/// Data required to persist a new refresh-token record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRefreshToken {
    /// The owning user.
    pub user_id: Uuid,
    /// The token's `jti` claim.
    pub token_id: Uuid,
    /// Argon2 hash of the full token string.
    pub token_hash: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: DateTime<Utc>, revoked_at: Option<DateTime<Utc>>) -> RefreshTokenRecord {
        RefreshTokenRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_id: Uuid::new_v4(),
            token_hash: "hash".to_string(),
            created_at: Utc::now(),
            expires_at,
            revoked_at,
            replaced_by: None,
        }
    }

    #[test]
    fn test_active_record() {
        let rec = record(Utc::now() + Duration::days(1), None);
        assert!(rec.is_active());
    }

    #[test]
    fn test_revoked_is_terminal() {
        let rec = record(Utc::now() + Duration::days(1), Some(Utc::now()));
        assert!(!rec.is_active());
    }

    #[test]
    fn test_expired_record() {
        let rec = record(Utc::now() - Duration::seconds(1), None);
        assert!(rec.is_expired());
        assert!(!rec.is_active());
    }
}
