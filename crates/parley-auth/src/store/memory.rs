//! In-memory credential store.
//!
//! Backs tests and ephemeral single-process deployments. State lives in a
//! pair of maps behind one mutex; everything is lost on restart.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::types::pagination::{PageRequest, PageResponse};
use parley_entity::token::{CreateRefreshToken, RefreshTokenRecord};
use parley_entity::user::model::CreateUser;
use parley_entity::user::{User, UserRole};

use super::CredentialStore;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    tokens: HashMap<Uuid, RefreshTokenRecord>,
}

/// Credential store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Inner>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every refresh-token record for a user, revoked ones included,
    /// oldest first. Used to inspect rotation chains.
    pub fn refresh_token_history(&self, user_id: Uuid) -> Vec<RefreshTokenRecord> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut records: Vec<RefreshTokenRecord> = inner
            .tokens
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        records
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        let mut inner = self.inner.lock().expect("store lock poisoned");

        let normalized = data.username.to_lowercase();
        if inner
            .users
            .values()
            .any(|u| u.deleted_at.is_none() && u.username.to_lowercase() == normalized)
        {
            return Err(AppError::conflict(format!(
                "Username '{}' is already taken",
                data.username
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username.clone(),
            password_hash: data.password_hash.clone(),
            role: data.role,
            avatar_url: data.avatar_url.clone(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
            deleted_at: None,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let normalized = username.to_lowercase();
        Ok(inner
            .users
            .values()
            .find(|u| u.deleted_at.is_none() && u.username.to_lowercase() == normalized)
            .cloned())
    }

    async fn list_users(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = users.len() as u64;
        let items = users
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn update_last_login(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.last_login_at = Some(at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_role(&self, user_id: Uuid, role: UserRole) -> AppResult<User> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn soft_delete_user(
        &self,
        user_id: Uuid,
        placeholder_username: &str,
        unusable_hash: &str,
    ) -> AppResult<User> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let user = inner
            .users
            .get_mut(&user_id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        user.username = placeholder_username.to_string();
        user.password_hash = unusable_hash.to_string();
        user.avatar_url = None;
        user.deleted_at = Some(Utc::now());
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_refresh_token(
        &self,
        data: &CreateRefreshToken,
    ) -> AppResult<RefreshTokenRecord> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            token_id: data.token_id,
            token_hash: data.token_hash.clone(),
            created_at: Utc::now(),
            expires_at: data.expires_at,
            revoked_at: None,
            replaced_by: None,
        };
        inner.tokens.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_active_refresh_token(
        &self,
        token_id: Uuid,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .tokens
            .values()
            .find(|r| r.token_id == token_id && r.is_active())
            .cloned())
    }

    async fn find_active_refresh_tokens_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<RefreshTokenRecord>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut records: Vec<RefreshTokenRecord> = inner
            .tokens
            .values()
            .filter(|r| r.user_id == user_id && r.is_active())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }

    async fn revoke_refresh_token(&self, id: Uuid, replaced_by: Option<Uuid>) -> AppResult<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let record = inner
            .tokens
            .get_mut(&id)
            .filter(|r| r.revoked_at.is_none())
            .ok_or_else(|| {
                AppError::not_found(format!("Refresh token {id} not found or already revoked"))
            })?;
        record.revoked_at = Some(Utc::now());
        record.replaced_by = replaced_by;
        Ok(())
    }

    async fn revoke_all_refresh_tokens_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let mut revoked = 0u64;
        for record in inner.tokens.values_mut() {
            if record.user_id == user_id && record.revoked_at.is_none() {
                record.revoked_at = Some(Utc::now());
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}
