//! Session lifecycle manager — register, login, refresh, logout flows,
//! plus the administrative account operations.
//!
//! Refresh tokens are single-use. Each successful refresh creates the
//! replacement record first and only then revokes the consumed record,
//! linking it to its successor; the `replaced_by` chain is the audit trail
//! of rotations. A replayed (already-rotated) token fails exactly like an
//! unknown one — that uniform failure is the replay-detection tripwire.

use std::sync::Arc;

use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use parley_core::config::auth::AuthConfig;
use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::traits::{AuditAction, AuditEvent, AuditSink};
use parley_entity::token::{CreateRefreshToken, RefreshTokenRecord};
use parley_entity::user::model::CreateUser;
use parley_entity::user::{User, UserRole};

use crate::jwt::{JwtDecoder, JwtEncoder};
use crate::password::{PasswordHasher, PasswordValidator};
use crate::store::CredentialStore;
use crate::validate::{normalize_username, validate_avatar_url, validate_username};

/// Uniform message for every credential failure. Unknown usernames and
/// wrong passwords are indistinguishable to the caller.
const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Uniform message for every refresh failure, regardless of cause.
const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";

/// A freshly issued access + refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived, single-use refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: chrono::DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: chrono::DateTime<Utc>,
}

/// Result of a successful login or refresh.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    /// Generated token pair.
    pub tokens: TokenPair,
    /// The authenticated user.
    pub user: User,
}

/// Internal refresh-failure reasons, surfaced only through the audit log.
#[derive(Debug, Clone, Copy)]
enum RefreshFailure {
    Missing,
    InvalidOrExpired,
    NotRecognized,
    UnknownUser,
}

impl RefreshFailure {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "MISSING",
            Self::InvalidOrExpired => "INVALID_OR_EXPIRED",
            Self::NotRecognized => "NOT_RECOGNIZED",
            Self::UnknownUser => "UNKNOWN_USER",
        }
    }
}

/// Manages the complete session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    /// Credential persistence boundary.
    store: Arc<dyn CredentialStore>,
    /// Append-only audit sink.
    audit: Arc<dyn AuditSink>,
    /// JWT encoder for token generation.
    encoder: Arc<JwtEncoder>,
    /// JWT decoder for token validation.
    decoder: Arc<JwtDecoder>,
    /// Hasher for passwords and refresh-token digests.
    hasher: Arc<PasswordHasher>,
    /// Password policy.
    password_validator: PasswordValidator,
    /// Auth configuration.
    config: AuthConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        audit: Arc<dyn AuditSink>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        hasher: Arc<PasswordHasher>,
        config: AuthConfig,
    ) -> Self {
        let password_validator = PasswordValidator::new(&config);
        Self {
            store,
            audit,
            encoder,
            decoder,
            hasher,
            password_validator,
            config,
        }
    }

    /// Registers a new user account with the default role.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        avatar_url: Option<&str>,
    ) -> AppResult<User> {
        validate_username(username, self.config.username_min_length)?;
        self.password_validator.validate(password)?;
        if let Some(url) = avatar_url {
            validate_avatar_url(url)?;
        }

        let username = username.trim();
        if self
            .store
            .find_user_by_username(username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Username '{username}' is already taken"
            )));
        }

        let password_hash = self.hasher.hash(password)?;
        let user = self
            .store
            .create_user(&CreateUser {
                username: username.to_string(),
                password_hash,
                role: UserRole::User,
                avatar_url: avatar_url.map(String::from),
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        self.audit
            .append(
                AuditEvent::new(Some(user.id), AuditAction::AuthRegister, "user")
                    .entity_id(user.id)
                    .after(serde_json::json!({
                        "username": user.username,
                        "role": user.role,
                    })),
            )
            .await;

        Ok(user)
    }

    /// Verifies credentials and issues a fresh token pair.
    ///
    /// Unknown usernames and wrong passwords fail with the same error shape;
    /// only the audit record differs (no actor attached for unknown names).
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthenticatedSession> {
        let normalized = normalize_username(username);

        let Some(user) = self.store.find_user_by_username(&normalized).await? else {
            self.audit
                .append(
                    AuditEvent::new(None, AuditAction::AuthLoginFailed, "user")
                        .metadata(serde_json::json!({ "username": normalized })),
                )
                .await;
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };

        if !self.hasher.verify(&user.password_hash, password)? {
            self.audit
                .append(
                    AuditEvent::new(Some(user.id), AuditAction::AuthLoginFailed, "user")
                        .entity_id(user.id),
                )
                .await;
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        let (tokens, _record) = self.issue_tokens(&user).await?;
        self.store.update_last_login(user.id, Utc::now()).await?;

        info!(user_id = %user.id, "Login successful");

        self.audit
            .append(
                AuditEvent::new(Some(user.id), AuditAction::AuthLoginSuccess, "user")
                    .entity_id(user.id),
            )
            .await;

        let user = User {
            last_login_at: Some(Utc::now()),
            ..user
        };
        Ok(AuthenticatedSession { tokens, user })
    }

    /// Consumes a refresh token and rotates it into a new token pair.
    ///
    /// Every failure surfaces the same generic [`AppError`]; the specific
    /// cause is recorded only in the audit trail.
    pub async fn refresh(&self, presented: Option<&str>) -> AppResult<AuthenticatedSession> {
        let Some(token) = presented else {
            return Err(self.refresh_failed(None, RefreshFailure::Missing).await);
        };

        let claims = match self.decoder.decode_refresh(token) {
            Ok(claims) => claims,
            Err(_) => {
                return Err(
                    self.refresh_failed(None, RefreshFailure::InvalidOrExpired)
                        .await,
                );
            }
        };

        let actor = Some(claims.sub);
        let Some(token_id) = claims.jti else {
            return Err(
                self.refresh_failed(actor, RefreshFailure::NotRecognized)
                    .await,
            );
        };

        // Revoked records are excluded from this lookup, so a replayed
        // token resolves identically to an unknown one.
        let record = match self.store.find_active_refresh_token(token_id).await? {
            Some(record) if record.user_id == claims.sub => record,
            _ => {
                return Err(
                    self.refresh_failed(actor, RefreshFailure::NotRecognized)
                        .await,
                );
            }
        };

        if !self.hasher.verify(&record.token_hash, token)? {
            return Err(
                self.refresh_failed(actor, RefreshFailure::NotRecognized)
                    .await,
            );
        }

        let user = match self.store.find_user_by_id(claims.sub).await? {
            Some(user) if !user.is_deleted() => user,
            _ => {
                return Err(self.refresh_failed(actor, RefreshFailure::UnknownUser).await);
            }
        };

        // Rotate: create the replacement first, then revoke the consumed
        // record with a link to its successor.
        let (tokens, new_record) = self.issue_tokens(&user).await?;
        self.store
            .revoke_refresh_token(record.id, Some(new_record.id))
            .await?;

        info!(user_id = %user.id, "Refresh token rotated");

        self.audit
            .append(
                AuditEvent::new(Some(user.id), AuditAction::AuthRefreshSuccess, "refresh_token")
                    .entity_id(new_record.id)
                    .metadata(serde_json::json!({ "rotated_from": record.id })),
            )
            .await;

        Ok(AuthenticatedSession { tokens, user })
    }

    /// Revokes the presented refresh token.
    ///
    /// Idempotent and silent: absence or invalidity of the token is
    /// accepted as a no-op, and `AUTH_LOGOUT` is audited only when a
    /// revocation actually occurred.
    pub async fn logout(&self, presented: Option<&str>) {
        let Some(token) = presented else { return };
        let Ok(claims) = self.decoder.decode_refresh(token) else {
            return;
        };
        let Some(token_id) = claims.jti else { return };

        let Ok(Some(record)) = self.store.find_active_refresh_token(token_id).await else {
            return;
        };
        if record.user_id != claims.sub {
            return;
        }
        if !matches!(self.hasher.verify(&record.token_hash, token), Ok(true)) {
            return;
        }

        if self
            .store
            .revoke_refresh_token(record.id, None)
            .await
            .is_ok()
        {
            info!(user_id = %claims.sub, "Logout: refresh token revoked");
            self.audit
                .append(
                    AuditEvent::new(Some(claims.sub), AuditAction::AuthLogout, "refresh_token")
                        .entity_id(record.id),
                )
                .await;
        }
    }

    /// Lists a user's currently active refresh-token records, bounded by
    /// the configured limit.
    pub async fn active_refresh_tokens(&self, user_id: Uuid) -> AppResult<Vec<RefreshTokenRecord>> {
        self.store
            .find_active_refresh_tokens_for_user(user_id, self.config.active_token_limit)
            .await
    }

    /// Changes a user's role. Admin only.
    pub async fn change_role(
        &self,
        actor_id: Uuid,
        actor_role: UserRole,
        user_id: Uuid,
        new_role: UserRole,
    ) -> AppResult<User> {
        if !actor_role.is_admin() {
            return Err(AppError::authorization("Administrator role required"));
        }

        let before = match self.store.find_user_by_id(user_id).await? {
            Some(user) if !user.is_deleted() => user,
            _ => return Err(AppError::not_found(format!("User {user_id} not found"))),
        };

        let after = self.store.update_role(user_id, new_role).await?;

        info!(
            actor_id = %actor_id,
            user_id = %user_id,
            old_role = %before.role,
            new_role = %new_role,
            "User role changed"
        );

        self.audit
            .append(
                AuditEvent::new(Some(actor_id), AuditAction::UserRoleChanged, "user")
                    .entity_id(user_id)
                    .before(serde_json::json!({ "role": before.role }))
                    .after(serde_json::json!({ "role": after.role })),
            )
            .await;

        Ok(after)
    }

    /// Soft-deletes a user. Admin only.
    ///
    /// The username is rewritten to a collision-resistant placeholder
    /// (freeing the original spelling for reuse), the password hash is
    /// replaced with the hash of a random secret no one knows, the avatar
    /// is cleared, and every active refresh token is revoked.
    pub async fn delete_user(
        &self,
        actor_id: Uuid,
        actor_role: UserRole,
        user_id: Uuid,
    ) -> AppResult<User> {
        if !actor_role.is_admin() {
            return Err(AppError::authorization("Administrator role required"));
        }

        let before = match self.store.find_user_by_id(user_id).await? {
            Some(user) if !user.is_deleted() => user,
            _ => return Err(AppError::not_found(format!("User {user_id} not found"))),
        };

        let placeholder = format!("deleted-{}", random_suffix());
        let unusable_hash = self.hasher.hash(&random_suffix())?;

        let deleted = self
            .store
            .soft_delete_user(user_id, &placeholder, &unusable_hash)
            .await?;
        let revoked = self.store.revoke_all_refresh_tokens_for_user(user_id).await?;

        warn!(
            actor_id = %actor_id,
            user_id = %user_id,
            revoked_tokens = revoked,
            "User soft-deleted"
        );

        self.audit
            .append(
                AuditEvent::new(Some(actor_id), AuditAction::UserDeleted, "user")
                    .entity_id(user_id)
                    .before(serde_json::json!({ "username": before.username }))
                    .metadata(serde_json::json!({ "revoked_tokens": revoked })),
            )
            .await;

        Ok(deleted)
    }

    /// Signs a new refresh token, persists its record, and signs a matching
    /// access token.
    async fn issue_tokens(&self, user: &User) -> AppResult<(TokenPair, RefreshTokenRecord)> {
        let refresh = self.encoder.sign_refresh(user.id, user.role)?;
        let token_hash = self.hasher.hash(&refresh.token)?;

        let record = self
            .store
            .create_refresh_token(&CreateRefreshToken {
                user_id: user.id,
                token_id: refresh.token_id,
                token_hash,
                expires_at: refresh.expires_at,
            })
            .await?;

        let access = self.encoder.sign_access(user.id, user.role)?;

        Ok((
            TokenPair {
                access_token: access.token,
                refresh_token: refresh.token,
                access_expires_at: access.expires_at,
                refresh_expires_at: refresh.expires_at,
            },
            record,
        ))
    }

    /// Audits a refresh failure and produces the uniform error.
    async fn refresh_failed(&self, actor: Option<Uuid>, reason: RefreshFailure) -> AppError {
        warn!(reason = reason.as_str(), "Refresh rejected");
        self.audit
            .append(
                AuditEvent::new(actor, AuditAction::AuthRefreshFailed, "refresh_token")
                    .metadata(serde_json::json!({ "reason": reason.as_str() })),
            )
            .await;
        AppError::authentication(INVALID_REFRESH_TOKEN)
    }
}

/// A short random suffix for soft-delete placeholders and unusable secrets.
fn random_suffix() -> String {
    use argon2::password_hash::rand_core::{OsRng, RngCore};
    let mut bytes = [0u8; 9];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
