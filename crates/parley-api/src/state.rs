//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use parley_auth::jwt::{JwtDecoder, JwtEncoder};
use parley_auth::password::PasswordHasher;
use parley_auth::session::SessionManager;
use parley_auth::store::CredentialStore;
use parley_core::config::AppConfig;
use parley_core::traits::AuditSink;
use parley_database::repositories::audit::AuditLogRepository;
use parley_database::repositories::message::MessageRepository;
use parley_realtime::RealtimeGateway;

/// Application state containing all shared dependencies.
///
/// Passed to every axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Credential persistence boundary.
    pub credential_store: Arc<dyn CredentialStore>,
    /// Append-only audit sink.
    pub audit: Arc<dyn AuditSink>,
    /// JWT token encoder.
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher (Argon2).
    pub password_hasher: Arc<PasswordHasher>,
    /// Session lifecycle manager.
    pub session_manager: Arc<SessionManager>,
    /// Realtime presence and broadcast gateway.
    pub gateway: Arc<RealtimeGateway>,
    /// Chat message repository.
    pub message_repo: Arc<MessageRepository>,
    /// Audit log repository (admin search).
    pub audit_repo: Arc<AuditLogRepository>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}
