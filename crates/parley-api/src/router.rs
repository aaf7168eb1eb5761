//! Route definitions for the Parley HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`; the
//! WebSocket upgrade lives at `/ws`.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(message_routes())
        .merge(presence_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Auth endpoints: register, login, refresh, logout.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
}

/// User self-service endpoints.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(handlers::user::me))
        .route("/users/me/sessions", get(handlers::user::sessions))
}

/// Message CRUD endpoints.
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", get(handlers::message::list))
        .route("/messages", post(handlers::message::create))
        .route("/messages/{id}", put(handlers::message::update))
        .route("/messages/{id}", delete(handlers::message::delete))
}

/// Presence roster endpoint.
fn presence_routes() -> Router<AppState> {
    Router::new().route("/presence", get(handlers::presence::list))
}

/// Admin endpoints: account management and audit search.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/{id}/role", put(handlers::admin::change_role))
        .route("/admin/users/{id}", delete(handlers::admin::delete_user))
        .route("/admin/audit", get(handlers::admin::list_audit))
}

/// Health endpoint.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
