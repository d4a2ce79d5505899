//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::collaborators::{IdentityResolver, MessageStore, Summarizer};
use crate::config::Config;
use crate::delivery::DeliveryTracker;
use crate::registry::ConnectionRegistry;
use crate::router::EventRouter;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: ConnectionRegistry,
    pub router: EventRouter,
    pub delivery: DeliveryTracker,
    pub store: Arc<dyn MessageStore>,
    pub identity: Arc<dyn IdentityResolver>,
    /// Optional collaborator; summary requests fail with 503 when absent.
    pub summarizer: Option<Arc<dyn Summarizer>>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn MessageStore>,
        identity: Arc<dyn IdentityResolver>,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Self {
        let registry = ConnectionRegistry::new(config.outbound_queue_capacity);
        let router = EventRouter::new(registry.clone());
        let delivery = DeliveryTracker::new(store.clone(), router.clone());
        Self {
            config,
            registry,
            router,
            delivery,
            store,
            identity,
            summarizer,
        }
    }
}
