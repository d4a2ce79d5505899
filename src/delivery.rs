//! Delivery state tracker.
//!
//! Owns the seen-state transition: bulk-mark a conversation direction as
//! seen in storage, then notify the original sender in real time. The
//! notification is emitted even when nothing changed, so a re-acknowledging
//! client still converges the sender's view.

use std::sync::Arc;
use uuid::Uuid;

use crate::collaborators::MessageStore;
use crate::error::AppResult;
use crate::router::EventRouter;

#[derive(Clone)]
pub struct DeliveryTracker {
    store: Arc<dyn MessageStore>,
    router: EventRouter,
}

impl DeliveryTracker {
    pub fn new(store: Arc<dyn MessageStore>, router: EventRouter) -> Self {
        Self { store, router }
    }

    /// `acking_user` has viewed every message `peer` sent them.
    ///
    /// Storage is the source of truth: the seen flags are flipped first, and
    /// only then is the peer notified. Returns how many messages changed
    /// state. Storage failure aborts before any notification.
    pub async fn acknowledge(&self, acking_user: Uuid, peer: Uuid) -> AppResult<u64> {
        let updated = self.store.mark_seen(acking_user, peer).await?;
        if updated > 0 {
            tracing::debug!(%acking_user, %peer, updated, "marked messages seen");
        }
        self.router.route_seen(acking_user, peer).await;
        Ok(updated)
    }
}
