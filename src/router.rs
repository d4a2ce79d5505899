//! Event router: point-to-point dispatch of real-time events.
//!
//! Routing is best-effort. An offline recipient, a full queue and a closed
//! channel all look the same to the caller: the event is simply not pushed.
//! Delivery guarantees for messages come from storage plus reconnect
//! history fetch, never from this layer.

use uuid::Uuid;

use crate::events::ServerEvent;
use crate::models::Message;
use crate::registry::ConnectionRegistry;

#[derive(Clone)]
pub struct EventRouter {
    registry: ConnectionRegistry,
}

impl EventRouter {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Push a freshly persisted message to its recipient, if online.
    pub async fn route_message(&self, message: &Message) {
        let recipient = message.receiver_id;
        self.dispatch(
            message.sender_id,
            recipient,
            ServerEvent::MessageNew {
                message: message.clone(),
            },
        )
        .await;
    }

    /// Relay a typing transition from `sender` to `receiver`.
    pub async fn route_typing(&self, sender: Uuid, receiver: Uuid, started: bool) {
        let event = if started {
            ServerEvent::TypingStarted { sender_id: sender }
        } else {
            ServerEvent::TypingStopped { sender_id: sender }
        };
        self.dispatch(sender, receiver, event).await;
    }

    /// Notify `recipient` that `seen_by` has viewed their messages.
    pub async fn route_seen(&self, seen_by: Uuid, recipient: Uuid) {
        self.dispatch(seen_by, recipient, ServerEvent::MessagesSeen { seen_by })
            .await;
    }

    /// Events are never reflected to their originator, even when sender and
    /// recipient are distinct sessions of the same user id.
    async fn dispatch(&self, origin: Uuid, recipient: Uuid, event: ServerEvent) {
        if origin == recipient {
            tracing::debug!(%origin, event = event.event_type(), "suppressed self-echo");
            return;
        }
        match self.registry.lookup(recipient).await {
            Some(channel) => {
                channel.push(event);
            }
            None => {
                tracing::debug!(%recipient, event = event.event_type(), "recipient offline, event dropped");
            }
        }
    }
}
