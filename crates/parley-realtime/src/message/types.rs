//! Outbound WebSocket message type definitions.
//!
//! The event stream is not durable: clients that connect after a broadcast
//! never receive it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_entity::message::ChatMessage;

use crate::presence::OnlineUser;

/// Messages pushed by the server to every connected client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Full roster of online users, sent to all clients whenever presence
    /// changes so every roster stays consistent.
    PresenceSnapshot {
        /// Online users with connection counts.
        users: Vec<OnlineUser>,
        /// When the snapshot was captured.
        timestamp: DateTime<Utc>,
    },
    /// A new chat message was created.
    MessageCreated {
        /// The created message.
        message: ChatMessage,
        /// When the event was emitted.
        timestamp: DateTime<Utc>,
    },
    /// A chat message was edited.
    MessageUpdated {
        /// The updated message.
        message: ChatMessage,
        /// When the event was emitted.
        timestamp: DateTime<Utc>,
    },
    /// A chat message was deleted.
    MessageDeleted {
        /// ID of the deleted message.
        id: Uuid,
        /// When the event was emitted.
        timestamp: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let msg = OutboundMessage::MessageDeleted {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json.get("type").unwrap(), "message_deleted");
        assert!(json.get("id").is_some());
    }
}
