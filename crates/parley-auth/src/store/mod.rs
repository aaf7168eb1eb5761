//! Credential store boundary.
//!
//! The session manager reaches persistence only through [`CredentialStore`],
//! an opaque CRUD-style adapter. The Postgres implementation backs
//! production; the in-memory implementation backs tests and ephemeral
//! single-process deployments.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use parley_core::result::AppResult;
use parley_core::types::pagination::{PageRequest, PageResponse};
use parley_entity::token::{CreateRefreshToken, RefreshTokenRecord};
use parley_entity::user::model::CreateUser;
use parley_entity::user::{User, UserRole};

pub use memory::MemoryCredentialStore;
pub use postgres::PostgresCredentialStore;

/// Opaque persistence for users and refresh-token records.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new user.
    async fn create_user(&self, data: &CreateUser) -> AppResult<User>;

    /// Find a user by primary key (deleted users included — callers check).
    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a non-deleted user by case-insensitively normalized username.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// List non-deleted users, newest first.
    async fn list_users(&self, page: &PageRequest) -> AppResult<PageResponse<User>>;

    /// Record a successful login.
    async fn update_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Change a user's role.
    async fn update_role(&self, user_id: Uuid, role: UserRole) -> AppResult<User>;

    /// Soft-delete a user, mangling the username to `placeholder_username`
    /// and replacing the password hash with `unusable_hash`.
    async fn soft_delete_user(
        &self,
        user_id: Uuid,
        placeholder_username: &str,
        unusable_hash: &str,
    ) -> AppResult<User>;

    /// Persist a new refresh-token record.
    async fn create_refresh_token(
        &self,
        data: &CreateRefreshToken,
    ) -> AppResult<RefreshTokenRecord>;

    /// Find the active (non-revoked, non-expired) record with the given
    /// token ID, if any.
    async fn find_active_refresh_token(
        &self,
        token_id: Uuid,
    ) -> AppResult<Option<RefreshTokenRecord>>;

    /// List a user's active records, most recent first, bounded by `limit`.
    async fn find_active_refresh_tokens_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<RefreshTokenRecord>>;

    /// Revoke a record, optionally linking it to its replacement.
    async fn revoke_refresh_token(&self, id: Uuid, replaced_by: Option<Uuid>) -> AppResult<()>;

    /// Revoke every active record for a user. Returns the number revoked.
    async fn revoke_all_refresh_tokens_for_user(&self, user_id: Uuid) -> AppResult<u64>;
}
