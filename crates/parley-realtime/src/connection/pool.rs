//! Connection pool — tracks all active connections, indexed by connection
//! and user ID.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all active WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// Connection ID → handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// User ID → handles (one user can have multiple connections).
    by_user: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
}

impl ConnectionPool {
    /// Create a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Remove a connection from the pool.
    ///
    /// Returns `None` when the connection was already removed, making the
    /// disconnect path idempotent against duplicate close signals.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != *conn_id);
            if connections.is_empty() {
                drop(connections);
                self.by_user.remove(&handle.user_id);
            }
        }
        Some(handle)
    }

    /// Number of connections held by a user.
    pub fn user_connection_count(&self, user_id: &Uuid) -> usize {
        self.by_user.get(user_id).map(|c| c.len()).unwrap_or(0)
    }

    /// All connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(user_id: Uuid) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(8);
        Arc::new(ConnectionHandle::new(user_id, "alice".to_string(), tx))
    }

    #[test]
    fn test_add_and_remove() {
        let pool = ConnectionPool::new();
        let user = Uuid::new_v4();
        let conn = handle(user);
        let conn_id = conn.id;

        pool.add(conn);
        assert_eq!(pool.connection_count(), 1);
        assert_eq!(pool.user_connection_count(&user), 1);

        assert!(pool.remove(&conn_id).is_some());
        assert_eq!(pool.connection_count(), 0);
        assert_eq!(pool.user_count(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let pool = ConnectionPool::new();
        let conn = handle(Uuid::new_v4());
        let conn_id = conn.id;

        pool.add(conn);
        assert!(pool.remove(&conn_id).is_some());
        assert!(pool.remove(&conn_id).is_none());
    }

    #[test]
    fn test_multiple_connections_per_user() {
        let pool = ConnectionPool::new();
        let user = Uuid::new_v4();
        let first = handle(user);
        let second = handle(user);
        let first_id = first.id;

        pool.add(first);
        pool.add(second);
        assert_eq!(pool.user_connection_count(&user), 2);
        assert_eq!(pool.user_count(), 1);

        pool.remove(&first_id);
        assert_eq!(pool.user_connection_count(&user), 1);
        assert_eq!(pool.user_count(), 1);
    }
}
