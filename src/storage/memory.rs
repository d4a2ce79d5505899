//! In-memory `MessageStore` used by tests and local development.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::collaborators::MessageStore;
use crate::error::AppResult;
use crate::models::Message;

/// Messages are kept in insertion order, which is creation order here, so
/// `load_history` is chronological without sorting. The single lock makes
/// `mark_seen` atomic for readers: a concurrent `load_history` sees either
/// the fully-unmarked or fully-marked set.
#[derive(Default)]
pub struct MemoryStore {
    messages: RwLock<Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn between(message: &Message, user_a: Uuid, user_b: Uuid) -> bool {
    (message.sender_id == user_a && message.receiver_id == user_b)
        || (message.sender_id == user_b && message.receiver_id == user_a)
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn persist_message(&self, message: Message) -> AppResult<Message> {
        let mut guard = self.messages.write().await;
        guard.push(message.clone());
        Ok(message)
    }

    async fn load_history(&self, user_a: Uuid, user_b: Uuid) -> AppResult<Vec<Message>> {
        let guard = self.messages.read().await;
        Ok(guard
            .iter()
            .filter(|m| between(m, user_a, user_b))
            .cloned()
            .collect())
    }

    async fn mark_seen(&self, receiver: Uuid, sender: Uuid) -> AppResult<u64> {
        let mut guard = self.messages.write().await;
        let mut updated = 0;
        for message in guard.iter_mut() {
            if message.sender_id == sender && message.receiver_id == receiver && !message.seen {
                message.seen = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}
