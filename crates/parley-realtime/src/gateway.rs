//! Realtime gateway — connection registration and event fan-out.
//!
//! The gateway owns the connection pool and the presence tracker. Each
//! presence transition and the enqueue of its roster broadcast happen
//! under one ordering lock, so clients receive snapshots in mutation
//! order within this process. Message-mutating collaborators call the
//! fire-and-forget `broadcast_message_*` primitives.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use parley_core::config::realtime::RealtimeConfig;
use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_entity::message::ChatMessage;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::message::types::OutboundMessage;
use crate::presence::tracker::{OnlineUser, PresenceTracker};

/// Central real-time gateway shared by all connection tasks.
#[derive(Debug)]
pub struct RealtimeGateway {
    /// Connection pool.
    pool: ConnectionPool,
    /// Presence tracker.
    presence: PresenceTracker,
    /// Serializes presence transitions with their snapshot broadcasts, so
    /// rosters are delivered in mutation order. Held only across the map
    /// mutation and the non-blocking enqueue, never a network send.
    presence_order: std::sync::Mutex<()>,
    /// Configuration.
    config: RealtimeConfig,
}

impl RealtimeGateway {
    /// Creates a new gateway.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            pool: ConnectionPool::new(),
            presence: PresenceTracker::new(),
            presence_order: std::sync::Mutex::new(()),
            config,
        }
    }

    /// Registers an authenticated connection.
    ///
    /// Increments the user's presence count and broadcasts the updated
    /// roster to every connected client (the new one included). Returns
    /// the handle and the receiver half of the outbound queue.
    pub fn register(
        &self,
        user_id: Uuid,
        username: &str,
        avatar_url: Option<&str>,
    ) -> AppResult<(Arc<ConnectionHandle>, mpsc::Receiver<String>)> {
        if self.pool.user_connection_count(&user_id) >= self.config.max_connections_per_user {
            warn!(
                user_id = %user_id,
                max = self.config.max_connections_per_user,
                "Connection refused: per-user connection limit reached"
            );
            return Err(AppError::conflict("Too many simultaneous connections"));
        }

        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, username.to_string(), tx));

        self.pool.add(handle.clone());
        {
            let _order = self.presence_order.lock().expect("presence order poisoned");
            let snapshot = self.presence.connect(user_id, username, avatar_url);
            self.broadcast_snapshot(snapshot);
        }

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            username = %username,
            "WebSocket connection registered"
        );

        Ok((handle, rx))
    }

    /// Unregisters a connection and broadcasts the updated roster.
    ///
    /// Safe against duplicate close signals: the pool removal succeeds at
    /// most once, so presence is decremented exactly once per connection.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        let Some(handle) = self.pool.remove(conn_id) else {
            return;
        };
        handle.mark_closed();

        {
            let _order = self.presence_order.lock().expect("presence order poisoned");
            let snapshot = self.presence.disconnect(handle.user_id);
            self.broadcast_snapshot(snapshot);
        }

        info!(
            conn_id = %conn_id,
            user_id = %handle.user_id,
            "WebSocket connection unregistered"
        );
    }

    /// Announce a newly created message to all connected clients.
    pub fn broadcast_message_created(&self, message: &ChatMessage) {
        self.broadcast(&OutboundMessage::MessageCreated {
            message: message.clone(),
            timestamp: Utc::now(),
        });
    }

    /// Announce an edited message to all connected clients.
    pub fn broadcast_message_updated(&self, message: &ChatMessage) {
        self.broadcast(&OutboundMessage::MessageUpdated {
            message: message.clone(),
            timestamp: Utc::now(),
        });
    }

    /// Announce a deleted message to all connected clients.
    pub fn broadcast_message_deleted(&self, id: Uuid) {
        self.broadcast(&OutboundMessage::MessageDeleted {
            id,
            timestamp: Utc::now(),
        });
    }

    /// Capture the current presence roster.
    pub fn presence_snapshot(&self) -> Vec<OnlineUser> {
        self.presence.snapshot()
    }

    /// Connection count for a user.
    pub fn user_connection_count(&self, user_id: Uuid) -> usize {
        self.pool.user_connection_count(&user_id)
    }

    /// Total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Deliver a message to every currently connected client.
    ///
    /// Fire-and-forget: failures for one connection never affect delivery
    /// to the others, and clients that connect afterwards never see it.
    pub fn broadcast(&self, message: &OutboundMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound message");
                return;
            }
        };

        for conn in self.pool.all_connections() {
            conn.send(&payload);
        }
    }

    fn broadcast_snapshot(&self, users: Vec<OnlineUser>) {
        self.broadcast(&OutboundMessage::PresenceSnapshot {
            users,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> RealtimeGateway {
        RealtimeGateway::new(RealtimeConfig::default())
    }

    async fn recv_json(rx: &mut mpsc::Receiver<String>) -> serde_json::Value {
        let payload = rx.recv().await.expect("expected a message");
        serde_json::from_str(&payload).expect("valid JSON payload")
    }

    #[tokio::test]
    async fn test_register_broadcasts_snapshot_to_all() {
        let gw = gateway();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let (_h1, mut rx1) = gw.register(alice, "alice", None).unwrap();
        let first = recv_json(&mut rx1).await;
        assert_eq!(first["type"], "presence_snapshot");
        assert_eq!(first["users"].as_array().unwrap().len(), 1);

        let (_h2, mut rx2) = gw.register(bob, "bob", None).unwrap();

        // Both the existing and the new connection observe the new roster.
        let seen_by_alice = recv_json(&mut rx1).await;
        let seen_by_bob = recv_json(&mut rx2).await;
        assert_eq!(seen_by_alice["users"].as_array().unwrap().len(), 2);
        assert_eq!(seen_by_bob["users"], seen_by_alice["users"]);
    }

    #[tokio::test]
    async fn test_two_tabs_then_disconnects() {
        let gw = gateway();
        let alice = Uuid::new_v4();

        let (h1, _rx1) = gw.register(alice, "alice", None).unwrap();
        let (h2, _rx2) = gw.register(alice, "alice", None).unwrap();
        assert_eq!(gw.user_connection_count(alice), 2);
        assert_eq!(gw.presence_snapshot()[0].connections, 2);

        gw.unregister(&h1.id);
        assert_eq!(gw.user_connection_count(alice), 1);
        assert_eq!(gw.presence_snapshot()[0].connections, 1);

        gw.unregister(&h2.id);
        assert!(gw.presence_snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_close_is_idempotent() {
        let gw = gateway();
        let alice = Uuid::new_v4();

        let (h1, _rx1) = gw.register(alice, "alice", None).unwrap();
        let (_h2, _rx2) = gw.register(alice, "alice", None).unwrap();

        gw.unregister(&h1.id);
        gw.unregister(&h1.id);

        // The second close signal must not decrement presence again.
        assert_eq!(gw.presence_snapshot()[0].connections, 1);
    }

    #[tokio::test]
    async fn test_connection_limit_refused_without_presence_mutation() {
        let gw = RealtimeGateway::new(RealtimeConfig {
            max_connections_per_user: 1,
            ..RealtimeConfig::default()
        });
        let alice = Uuid::new_v4();

        let (_h1, _rx1) = gw.register(alice, "alice", None).unwrap();
        assert!(gw.register(alice, "alice", None).is_err());
        assert_eq!(gw.presence_snapshot()[0].connections, 1);
    }

    #[tokio::test]
    async fn test_message_broadcast_reaches_all_connections() {
        let gw = gateway();
        let (_h1, mut rx1) = gw.register(Uuid::new_v4(), "alice", None).unwrap();
        let (_h2, mut rx2) = gw.register(Uuid::new_v4(), "bob", None).unwrap();

        // Drain the presence snapshots emitted during registration.
        recv_json(&mut rx1).await;
        recv_json(&mut rx1).await;
        recv_json(&mut rx2).await;

        gw.broadcast_message_deleted(Uuid::new_v4());

        assert_eq!(recv_json(&mut rx1).await["type"], "message_deleted");
        assert_eq!(recv_json(&mut rx2).await["type"], "message_deleted");
    }

    #[tokio::test]
    async fn test_closed_receiver_does_not_poison_broadcast() {
        let gw = gateway();
        let (_h1, rx1) = gw.register(Uuid::new_v4(), "alice", None).unwrap();
        let (_h2, mut rx2) = gw.register(Uuid::new_v4(), "bob", None).unwrap();
        drop(rx1);

        recv_json(&mut rx2).await;
        recv_json(&mut rx2).await;

        gw.broadcast_message_deleted(Uuid::new_v4());
        assert_eq!(recv_json(&mut rx2).await["type"], "message_deleted");
    }
}
