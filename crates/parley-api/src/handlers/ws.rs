//! WebSocket upgrade handler.
//!
//! The handshake token is authenticated before the upgrade is accepted; a
//! rejected handshake never touches presence. Display metadata comes from
//! the credential store, not from token claims.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use parley_core::error::AppError;
use parley_entity::user::User;
use parley_realtime::connection::WsAuthenticator;

use crate::state::AppState;

/// Query parameters for the WebSocket handshake.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// A previously issued access token.
    pub token: String,
}

/// GET /ws?token={jwt} — WebSocket upgrade.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, AppError> {
    // Authenticate before accepting the upgrade.
    let authenticator = WsAuthenticator::new(state.jwt_decoder.clone());
    let client = authenticator.authenticate(&query.token)?;

    // The token only proves identity; the user must still exist.
    let user = state
        .credential_store
        .find_user_by_id(client.user_id)
        .await?
        .filter(|u| !u.is_deleted())
        .ok_or_else(|| AppError::authentication("Unknown user"))?;

    Ok(ws.on_upgrade(move |socket| handle_connection(state, user, socket)))
}

/// Drives an established WebSocket connection until it closes.
async fn handle_connection(state: AppState, user: User, mut socket: WebSocket) {
    let (handle, mut outbound_rx) =
        match state
            .gateway
            .register(user.id, &user.username, user.avatar_url.as_deref())
        {
            Ok(registered) => registered,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Connection registration refused");
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
        };

    let conn_id = handle.id;
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Forward queued outbound broadcasts to the socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // The inbound loop exists to observe the close; clients do not push
    // domain events over the socket.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Text(text)) => {
                debug!(conn_id = %conn_id, len = text.len(), "Ignoring inbound frame");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.gateway.unregister(&conn_id);
}
