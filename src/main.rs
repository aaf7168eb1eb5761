//! Parley server — multi-user chat service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use parley_api::router::build_router;
use parley_api::state::AppState;
use parley_auth::jwt::{JwtDecoder, JwtEncoder};
use parley_auth::password::PasswordHasher;
use parley_auth::session::SessionManager;
use parley_auth::store::{CredentialStore, PostgresCredentialStore};
use parley_core::config::AppConfig;
use parley_core::error::AppError;
use parley_core::traits::AuditSink;
use parley_database::connection::DatabasePool;
use parley_database::migration;
use parley_database::repositories::audit::AuditLogRepository;
use parley_database::repositories::message::MessageRepository;
use parley_realtime::RealtimeGateway;

#[tokio::main]
async fn main() {
    let env = std::env::var("PARLEY_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Parley v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;
    migration::run_migrations(db.pool()).await?;
    let db_pool = db.into_pool();

    let credential_store: Arc<dyn CredentialStore> =
        Arc::new(PostgresCredentialStore::new(db_pool.clone()));
    let audit_repo = Arc::new(AuditLogRepository::new(db_pool.clone()));
    let audit: Arc<dyn AuditSink> = audit_repo.clone();

    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
    let password_hasher = Arc::new(PasswordHasher::new());

    let session_manager = Arc::new(SessionManager::new(
        credential_store.clone(),
        audit.clone(),
        jwt_encoder.clone(),
        jwt_decoder.clone(),
        password_hasher.clone(),
        config.auth.clone(),
    ));

    let gateway = Arc::new(RealtimeGateway::new(config.realtime.clone()));
    let message_repo = Arc::new(MessageRepository::new(db_pool.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        db_pool,
        credential_store,
        audit,
        jwt_encoder,
        jwt_decoder,
        password_hasher,
        session_manager,
        gateway,
        message_repo,
        audit_repo,
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server failed: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
