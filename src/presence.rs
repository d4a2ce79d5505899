//! Presence publisher.
//!
//! Watches the registry's presence snapshots and fans the online set out to
//! every connected channel. Presence is eventually consistent: the broadcast
//! is not ordered against routed events, and rapid connect/disconnect bursts
//! may coalesce into a single update.

use tokio::task::JoinHandle;

use crate::events::ServerEvent;
use crate::registry::ConnectionRegistry;

pub struct PresencePublisher {
    registry: ConnectionRegistry,
}

impl PresencePublisher {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut watch_rx = self.registry.presence_watch();
        while watch_rx.changed().await.is_ok() {
            let online_user_ids = watch_rx.borrow_and_update().clone();
            tracing::debug!(online = online_user_ids.len(), "broadcasting presence update");
            self.registry
                .broadcast(ServerEvent::PresenceUpdate { online_user_ids })
                .await;
        }
    }
}
