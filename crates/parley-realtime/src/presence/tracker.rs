//! Presence tracker — per-user connection counts and display metadata.
//!
//! Process-local, in-memory, non-durable state: rebuilt from scratch on
//! restart. All mutation and snapshot capture happens under one mutex so
//! every broadcast observes a consistent map; the lock is never held
//! across a network send.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Per-user presence state. Exists only while `connections > 0`.
#[derive(Debug, Clone)]
struct PresenceEntry {
    username: String,
    avatar_url: Option<String>,
    connections: u32,
}

/// A user visible in the presence roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineUser {
    /// User ID.
    pub user_id: Uuid,
    /// Display name, loaded from the credential store at connect time.
    pub username: String,
    /// Avatar reference.
    pub avatar_url: Option<String>,
    /// Number of simultaneous connections (tabs/devices).
    pub connections: u32,
}

/// Tracks which users are online and with how many connections.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    entries: Mutex<HashMap<Uuid, PresenceEntry>>,
}

impl PresenceTracker {
    /// Create a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection for a user and return the post-mutation
    /// roster snapshot, captured under the same lock.
    pub fn connect(
        &self,
        user_id: Uuid,
        username: &str,
        avatar_url: Option<&str>,
    ) -> Vec<OnlineUser> {
        let mut entries = self.entries.lock().expect("presence lock poisoned");
        entries
            .entry(user_id)
            .and_modify(|e| e.connections += 1)
            .or_insert_with(|| PresenceEntry {
                username: username.to_string(),
                avatar_url: avatar_url.map(String::from),
                connections: 1,
            });
        Self::snapshot_locked(&entries)
    }

    /// Record a disconnect for a user, removing the entry when the count
    /// reaches zero, and return the post-mutation roster snapshot.
    pub fn disconnect(&self, user_id: Uuid) -> Vec<OnlineUser> {
        let mut entries = self.entries.lock().expect("presence lock poisoned");
        match entries.get_mut(&user_id) {
            Some(entry) if entry.connections > 1 => {
                entry.connections -= 1;
            }
            Some(_) => {
                entries.remove(&user_id);
            }
            None => {
                // A disconnect with no matching connect would drive the
                // count negative; refuse and log instead.
                warn!(user_id = %user_id, "Disconnect for user with no presence entry");
            }
        }
        Self::snapshot_locked(&entries)
    }

    /// Capture the current roster.
    pub fn snapshot(&self) -> Vec<OnlineUser> {
        let entries = self.entries.lock().expect("presence lock poisoned");
        Self::snapshot_locked(&entries)
    }

    /// Connection count for a user (0 when absent).
    pub fn connection_count(&self, user_id: Uuid) -> u32 {
        let entries = self.entries.lock().expect("presence lock poisoned");
        entries.get(&user_id).map(|e| e.connections).unwrap_or(0)
    }

    /// Check if a user has at least one connection.
    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.connection_count(user_id) > 0
    }

    /// Number of distinct online users.
    pub fn online_count(&self) -> usize {
        self.entries.lock().expect("presence lock poisoned").len()
    }

    fn snapshot_locked(entries: &HashMap<Uuid, PresenceEntry>) -> Vec<OnlineUser> {
        let mut users: Vec<OnlineUser> = entries
            .iter()
            .map(|(user_id, entry)| OnlineUser {
                user_id: *user_id,
                username: entry.username.clone(),
                avatar_url: entry.avatar_url.clone(),
                connections: entry.connections,
            })
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_creates_entry() {
        let tracker = PresenceTracker::new();
        let user = Uuid::new_v4();

        let snapshot = tracker.connect(user, "alice", None);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].connections, 1);
        assert!(tracker.is_online(user));
    }

    #[test]
    fn test_two_tabs_same_user() {
        let tracker = PresenceTracker::new();
        let user = Uuid::new_v4();

        tracker.connect(user, "alice", None);
        let snapshot = tracker.connect(user, "alice", None);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].connections, 2);

        let snapshot = tracker.disconnect(user);
        assert_eq!(snapshot[0].connections, 1);
        assert!(tracker.is_online(user));

        let snapshot = tracker.disconnect(user);
        assert!(snapshot.is_empty());
        assert!(!tracker.is_online(user));
    }

    #[test]
    fn test_count_never_negative() {
        let tracker = PresenceTracker::new();
        let user = Uuid::new_v4();

        tracker.disconnect(user);
        assert_eq!(tracker.connection_count(user), 0);

        tracker.connect(user, "alice", None);
        tracker.disconnect(user);
        tracker.disconnect(user);
        assert_eq!(tracker.connection_count(user), 0);
        assert_eq!(tracker.online_count(), 0);
    }

    #[test]
    fn test_conservation_over_event_sequence() {
        let tracker = PresenceTracker::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        // connects − disconnects per user must equal the tracked count.
        tracker.connect(alice, "alice", None);
        tracker.connect(bob, "bob", Some("/avatars/bob.png"));
        tracker.connect(alice, "alice", None);
        tracker.connect(alice, "alice", None);
        tracker.disconnect(alice);

        assert_eq!(tracker.connection_count(alice), 2);
        assert_eq!(tracker.connection_count(bob), 1);
        assert_eq!(tracker.online_count(), 2);

        tracker.disconnect(bob);
        assert!(!tracker.is_online(bob));
        assert_eq!(tracker.online_count(), 1);
    }

    #[test]
    fn test_snapshot_sorted_by_username() {
        let tracker = PresenceTracker::new();
        tracker.connect(Uuid::new_v4(), "carol", None);
        tracker.connect(Uuid::new_v4(), "alice", None);
        tracker.connect(Uuid::new_v4(), "bob", None);

        let names: Vec<String> = tracker
            .snapshot()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }
}
