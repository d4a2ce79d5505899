//! Connection registry: user id -> active real-time channel.
//!
//! Exactly one connection per user. Registering a new channel for an
//! already-registered user replaces the previous entry and invalidates its
//! channel exactly once (the dropped sender ends the old session's receive
//! loop). Removal is idempotent and id-matched so a late close notification
//! from a replaced session never evicts its successor.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, RwLock};
use uuid::Uuid;

use crate::channel::ChannelHandle;
use crate::events::ServerEvent;

/// Unique identifier for one connection lifecycle.
///
/// Allows precise cleanup: `remove` only acts when the stored connection
/// still carries the caller's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

struct Connection {
    id: ConnectionId,
    channel: ChannelHandle,
}

#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Connection>>>,
    presence_tx: Arc<watch::Sender<Vec<Uuid>>>,
    queue_capacity: usize,
}

impl ConnectionRegistry {
    pub fn new(queue_capacity: usize) -> Self {
        let (presence_tx, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            presence_tx: Arc::new(presence_tx),
            queue_capacity,
        }
    }

    /// Subscribe to presence-set snapshots. The watch keeps only the latest
    /// snapshot, so bursts of connects/disconnects coalesce naturally.
    pub fn presence_watch(&self) -> watch::Receiver<Vec<Uuid>> {
        self.presence_tx.subscribe()
    }

    /// Atomically insert-or-replace the entry for `user_id`.
    ///
    /// Returns the connection id (for id-matched removal) and the receive
    /// half of the new outbound queue.
    pub async fn register(&self, user_id: Uuid) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let (channel, rx) = ChannelHandle::new(self.queue_capacity);
        let id = ConnectionId::new();

        let mut guard = self.inner.write().await;
        if guard.insert(user_id, Connection { id, channel }).is_some() {
            // The replaced sender is dropped here, which closes the old
            // session's receiver and ends its forward loop.
            tracing::debug!(%user_id, "replaced existing connection");
        }
        self.publish_presence(&guard);
        drop(guard);

        tracing::debug!(%user_id, connection = ?id, "connection registered");
        (id, rx)
    }

    /// Remove `user_id`'s entry if it still belongs to `connection_id`.
    /// No-op for unknown users or stale connection ids.
    pub async fn remove(&self, user_id: Uuid, connection_id: ConnectionId) {
        let mut guard = self.inner.write().await;
        let current = guard.get(&user_id).map(|c| c.id);
        if current == Some(connection_id) {
            guard.remove(&user_id);
            self.publish_presence(&guard);
            tracing::debug!(%user_id, "connection removed");
        }
    }

    pub async fn lookup(&self, user_id: Uuid) -> Option<ChannelHandle> {
        self.inner.read().await.get(&user_id).map(|c| c.channel.clone())
    }

    pub async fn online_users(&self) -> Vec<Uuid> {
        self.inner.read().await.keys().copied().collect()
    }

    /// Fire-and-forget fan-out to every connected channel.
    pub async fn broadcast(&self, event: ServerEvent) {
        let guard = self.inner.read().await;
        for connection in guard.values() {
            // Dropped pushes are absorbed; dead entries are cleaned up by
            // the owning session's close path.
            connection.channel.push(event.clone());
        }
    }

    fn publish_presence(&self, connections: &HashMap<Uuid, Connection>) {
        let snapshot: Vec<Uuid> = connections.keys().copied().collect();
        self.presence_tx.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_returns_most_recent_registration() {
        let registry = ConnectionRegistry::new(8);
        let user = Uuid::new_v4();

        let (_first_id, _first_rx) = registry.register(user).await;
        let (second_id, mut second_rx) = registry.register(user).await;

        let channel = registry.lookup(user).await.expect("user online");
        channel.push(ServerEvent::TypingStarted { sender_id: user });
        assert!(second_rx.recv().await.is_some());

        registry.remove(user, second_id).await;
        assert!(registry.lookup(user).await.is_none());
    }

    #[tokio::test]
    async fn replacement_closes_previous_channel_exactly_once() {
        let registry = ConnectionRegistry::new(8);
        let user = Uuid::new_v4();

        let (_old_id, mut old_rx) = registry.register(user).await;
        let (_new_id, _new_rx) = registry.register(user).await;

        // The old receiver ends because its only sender was dropped on
        // replacement.
        assert!(old_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn stale_remove_does_not_evict_new_connection() {
        let registry = ConnectionRegistry::new(8);
        let user = Uuid::new_v4();

        let (old_id, _old_rx) = registry.register(user).await;
        let (_new_id, _new_rx) = registry.register(user).await;

        // Late close notification from the replaced session.
        registry.remove(user, old_id).await;
        assert!(registry.lookup(user).await.is_some());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = ConnectionRegistry::new(8);
        let user = Uuid::new_v4();

        let (id, _rx) = registry.register(user).await;
        registry.remove(user, id).await;
        registry.remove(user, id).await;
        assert!(registry.lookup(user).await.is_none());
    }

    #[tokio::test]
    async fn presence_watch_tracks_membership() {
        let registry = ConnectionRegistry::new(8);
        let mut watch_rx = registry.presence_watch();
        let user = Uuid::new_v4();

        let (id, _rx) = registry.register(user).await;
        watch_rx.changed().await.unwrap();
        assert_eq!(watch_rx.borrow_and_update().as_slice(), &[user]);

        registry.remove(user, id).await;
        watch_rx.changed().await.unwrap();
        assert!(watch_rx.borrow_and_update().is_empty());
    }
}
