//! Postgres-backed credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use parley_core::result::AppResult;
use parley_core::types::pagination::{PageRequest, PageResponse};
use parley_database::repositories::refresh_token::RefreshTokenRepository;
use parley_database::repositories::user::UserRepository;
use parley_entity::token::{CreateRefreshToken, RefreshTokenRecord};
use parley_entity::user::model::CreateUser;
use parley_entity::user::{User, UserRole};

use super::CredentialStore;

/// Credential store backed by the PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    users: UserRepository,
    tokens: RefreshTokenRepository,
}

impl PostgresCredentialStore {
    /// Create a new store over the shared connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tokens: RefreshTokenRepository::new(pool),
        }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        self.users.create(data).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.users.find_by_username(username).await
    }

    async fn list_users(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        self.users.find_all(page).await
    }

    async fn update_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.users.update_last_login(user_id, at).await
    }

    async fn update_role(&self, user_id: Uuid, role: UserRole) -> AppResult<User> {
        self.users.update_role(user_id, role).await
    }

    async fn soft_delete_user(
        &self,
        user_id: Uuid,
        placeholder_username: &str,
        unusable_hash: &str,
    ) -> AppResult<User> {
        self.users
            .soft_delete(user_id, placeholder_username, unusable_hash)
            .await
    }

    async fn create_refresh_token(
        &self,
        data: &CreateRefreshToken,
    ) -> AppResult<RefreshTokenRecord> {
        self.tokens.create(data).await
    }

    async fn find_active_refresh_token(
        &self,
        token_id: Uuid,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        self.tokens.find_active_by_token_id(token_id).await
    }

    async fn find_active_refresh_tokens_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<RefreshTokenRecord>> {
        self.tokens.find_active_by_user(user_id, limit).await
    }

    async fn revoke_refresh_token(&self, id: Uuid, replaced_by: Option<Uuid>) -> AppResult<()> {
        self.tokens.revoke(id, replaced_by).await
    }

    async fn revoke_all_refresh_tokens_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        self.tokens.revoke_all_for_user(user_id).await
    }
}
