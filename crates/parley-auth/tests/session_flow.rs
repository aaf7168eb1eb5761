//! Session lifecycle tests over the in-memory credential store: rotation
//! single-use, chain integrity, idempotent logout, credential rejection
//! symmetry, and the administrative account operations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use parley_auth::jwt::{JwtDecoder, JwtEncoder};
use parley_auth::password::PasswordHasher;
use parley_auth::session::SessionManager;
use parley_auth::store::MemoryCredentialStore;
use parley_core::config::auth::AuthConfig;
use parley_core::error::ErrorKind;
use parley_core::traits::{AuditAction, AuditEvent, AuditSink};
use parley_entity::user::UserRole;
use parley_entity::user::model::CreateUser;

/// Audit sink that records every event in memory.
#[derive(Default)]
struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    fn count(&self, action: AuditAction) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.action == action)
            .count()
    }

    fn last_of(&self, action: AuditAction) -> Option<AuditEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|e| e.action == action)
            .cloned()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn append(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}

struct Harness {
    manager: SessionManager,
    store: Arc<MemoryCredentialStore>,
    audit: Arc<RecordingAuditSink>,
    hasher: Arc<PasswordHasher>,
}

fn harness() -> Harness {
    let config = AuthConfig {
        jwt_secret: "test-secret".to_string(),
        ..AuthConfig::default()
    };
    let store = Arc::new(MemoryCredentialStore::new());
    let audit = Arc::new(RecordingAuditSink::default());
    let hasher = Arc::new(PasswordHasher::new());

    let manager = SessionManager::new(
        store.clone(),
        audit.clone(),
        Arc::new(JwtEncoder::new(&config)),
        Arc::new(JwtDecoder::new(&config)),
        hasher.clone(),
        config,
    );

    Harness {
        manager,
        store,
        audit,
        hasher,
    }
}

impl Harness {
    /// Creates an admin directly through the store, bypassing register's
    /// fixed default role.
    async fn create_admin(&self, username: &str, password: &str) -> Uuid {
        use parley_auth::store::CredentialStore;
        let user = self
            .store
            .create_user(&CreateUser {
                username: username.to_string(),
                password_hash: self.hasher.hash(password).unwrap(),
                role: UserRole::Admin,
                avatar_url: None,
            })
            .await
            .unwrap();
        user.id
    }
}

#[tokio::test]
async fn test_register_login_refresh_replay_logout_scenario() {
    let h = harness();

    let user = h
        .manager
        .register("alice", "password123", None)
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::User);

    let session = h.manager.login("alice", "password123").await.unwrap();
    let original_refresh = session.tokens.refresh_token.clone();

    // Rotation succeeds and returns a fresh pair.
    let rotated = h.manager.refresh(Some(&original_refresh)).await.unwrap();
    assert_ne!(rotated.tokens.refresh_token, original_refresh);

    // Replay of the consumed token fails, even though the new token is unused.
    let err = h
        .manager
        .refresh(Some(&original_refresh))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);

    // Logout with the newest token; a subsequent refresh with it fails.
    h.manager
        .logout(Some(&rotated.tokens.refresh_token))
        .await;
    let err = h
        .manager
        .refresh(Some(&rotated.tokens.refresh_token))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_chain_integrity_after_sequential_refreshes() {
    let h = harness();
    let user = h
        .manager
        .register("alice", "password123", None)
        .await
        .unwrap();

    let session = h.manager.login("alice", "password123").await.unwrap();
    let mut refresh_token = session.tokens.refresh_token;

    const ROUNDS: usize = 3;
    for _ in 0..ROUNDS {
        let rotated = h.manager.refresh(Some(&refresh_token)).await.unwrap();
        refresh_token = rotated.tokens.refresh_token;
    }

    let history = h.store.refresh_token_history(user.id);
    assert_eq!(history.len(), ROUNDS + 1);

    let revoked: Vec<_> = history.iter().filter(|r| r.is_revoked()).collect();
    let active: Vec<_> = history.iter().filter(|r| r.is_active()).collect();
    assert_eq!(revoked.len(), ROUNDS);
    assert_eq!(active.len(), 1);

    // Each revoked record points at its successor; the chain terminates at
    // the single active record.
    let mut current = &history[0];
    for _ in 0..ROUNDS {
        let next_id = current.replaced_by.expect("revoked record must link");
        current = history.iter().find(|r| r.id == next_id).unwrap();
    }
    assert!(current.is_active());
    assert!(current.replaced_by.is_none());

    assert_eq!(h.audit.count(AuditAction::AuthRefreshSuccess), ROUNDS);
}

#[tokio::test]
async fn test_logout_is_idempotent_with_single_audit_record() {
    let h = harness();
    h.manager
        .register("alice", "password123", None)
        .await
        .unwrap();
    let session = h.manager.login("alice", "password123").await.unwrap();
    let refresh_token = session.tokens.refresh_token;

    h.manager.logout(Some(&refresh_token)).await;
    h.manager.logout(Some(&refresh_token)).await;

    assert_eq!(h.audit.count(AuditAction::AuthLogout), 1);
}

#[tokio::test]
async fn test_logout_without_token_is_a_silent_noop() {
    let h = harness();
    h.manager.logout(None).await;
    h.manager.logout(Some("garbage")).await;
    assert_eq!(h.audit.count(AuditAction::AuthLogout), 0);
}

#[tokio::test]
async fn test_credential_rejection_symmetry() {
    let h = harness();
    h.manager
        .register("alice", "password123", None)
        .await
        .unwrap();

    let unknown = h
        .manager
        .login("nobody", "password123")
        .await
        .unwrap_err();
    let wrong_password = h
        .manager
        .login("alice", "wrongpassword")
        .await
        .unwrap_err();

    // Identical shape and message; no username enumeration signal.
    assert_eq!(unknown.kind, ErrorKind::Authentication);
    assert_eq!(wrong_password.kind, ErrorKind::Authentication);
    assert_eq!(unknown.message, wrong_password.message);

    // The audit records differ only in whether an actor is attached.
    assert_eq!(h.audit.count(AuditAction::AuthLoginFailed), 2);
    let events = h.audit.events.lock().unwrap();
    let failed: Vec<_> = events
        .iter()
        .filter(|e| e.action == AuditAction::AuthLoginFailed)
        .collect();
    assert!(failed[0].actor_id.is_none());
    assert!(failed[1].actor_id.is_some());
}

#[tokio::test]
async fn test_refresh_failure_reasons_reach_the_audit_trail() {
    let h = harness();

    let err = h.manager.refresh(None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    let event = h.audit.last_of(AuditAction::AuthRefreshFailed).unwrap();
    assert_eq!(event.metadata.unwrap()["reason"], "MISSING");

    let err = h.manager.refresh(Some("not-a-jwt")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    let event = h.audit.last_of(AuditAction::AuthRefreshFailed).unwrap();
    assert_eq!(event.metadata.unwrap()["reason"], "INVALID_OR_EXPIRED");
}

#[tokio::test]
async fn test_register_validation_rules() {
    let h = harness();

    let err = h.manager.register("al", "password123", None).await;
    assert_eq!(err.unwrap_err().kind, ErrorKind::Validation);

    let err = h.manager.register("alice", "short", None).await;
    assert_eq!(err.unwrap_err().kind, ErrorKind::Validation);

    let err = h
        .manager
        .register("alice", "password123", Some("ftp://bad/avatar.png"))
        .await;
    assert_eq!(err.unwrap_err().kind, ErrorKind::Validation);

    let ok = h
        .manager
        .register("alice", "password123", Some("/avatars/alice.png"))
        .await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn test_duplicate_username_is_case_insensitive() {
    let h = harness();
    h.manager
        .register("alice", "password123", None)
        .await
        .unwrap();

    let err = h
        .manager
        .register("Alice", "password123", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_change_role_requires_admin() {
    let h = harness();
    let admin_id = h.create_admin("root", "password123").await;
    let bob = h
        .manager
        .register("bob", "password123", None)
        .await
        .unwrap();

    let err = h
        .manager
        .change_role(bob.id, UserRole::User, bob.id, UserRole::Admin)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let updated = h
        .manager
        .change_role(admin_id, UserRole::Admin, bob.id, UserRole::Admin)
        .await
        .unwrap();
    assert_eq!(updated.role, UserRole::Admin);
    assert_eq!(h.audit.count(AuditAction::UserRoleChanged), 1);
}

#[tokio::test]
async fn test_soft_delete_frees_username_and_revokes_tokens() {
    let h = harness();
    let admin_id = h.create_admin("root", "password123").await;
    let bob = h
        .manager
        .register("bob", "password123", Some("/avatars/bob.png"))
        .await
        .unwrap();
    let session = h.manager.login("bob", "password123").await.unwrap();

    let deleted = h
        .manager
        .delete_user(admin_id, UserRole::Admin, bob.id)
        .await
        .unwrap();
    assert!(deleted.is_deleted());
    assert!(deleted.username.starts_with("deleted-"));
    assert!(deleted.avatar_url.is_none());

    // The original username no longer resolves.
    let err = h.manager.login("bob", "password123").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);

    // All refresh tokens were bulk-revoked.
    let err = h
        .manager
        .refresh(Some(&session.tokens.refresh_token))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);

    // Soft deletion freed the original spelling for reuse.
    let reregistered = h.manager.register("bob", "password123", None).await;
    assert!(reregistered.is_ok());

    assert_eq!(h.audit.count(AuditAction::UserDeleted), 1);
}

#[tokio::test]
async fn test_login_updates_last_login_and_audits() {
    let h = harness();
    let user = h
        .manager
        .register("alice", "password123", None)
        .await
        .unwrap();
    assert!(user.last_login_at.is_none());

    let session = h.manager.login("alice", "password123").await.unwrap();
    assert!(session.user.last_login_at.is_some());
    assert_eq!(h.audit.count(AuditAction::AuthLoginSuccess), 1);
    assert_eq!(h.audit.count(AuditAction::AuthRegister), 1);
}

#[tokio::test]
async fn test_active_sessions_reflect_multiple_logins() {
    let h = harness();
    let user = h
        .manager
        .register("alice", "password123", None)
        .await
        .unwrap();

    h.manager.login("alice", "password123").await.unwrap();
    let second = h.manager.login("alice", "password123").await.unwrap();

    // Two devices, two concurrently active refresh records.
    let active = h.manager.active_refresh_tokens(user.id).await.unwrap();
    assert_eq!(active.len(), 2);

    // Rotating one leaves the count unchanged; logout drops it to one.
    let rotated = h
        .manager
        .refresh(Some(&second.tokens.refresh_token))
        .await
        .unwrap();
    assert_eq!(h.manager.active_refresh_tokens(user.id).await.unwrap().len(), 2);

    h.manager.logout(Some(&rotated.tokens.refresh_token)).await;
    assert_eq!(h.manager.active_refresh_tokens(user.id).await.unwrap().len(), 1);
}
