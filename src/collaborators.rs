//! Boundary contracts for external collaborators.
//!
//! The core never embeds storage, authentication or summarization logic; it
//! calls these traits and reacts to success or failure. Failures surface to
//! the invoking caller only; the real-time layer performs no retries.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Message;

/// Persistent message storage.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn persist_message(&self, message: Message) -> AppResult<Message>;

    /// Full conversation between two users, chronological order.
    async fn load_history(&self, user_a: Uuid, user_b: Uuid) -> AppResult<Vec<Message>>;

    /// Bulk-mark every message from `sender` to `receiver` as seen.
    /// Returns the number of messages updated; zero on re-acknowledgment.
    /// Must be atomic from the point of view of concurrent readers.
    async fn mark_seen(&self, receiver: Uuid, sender: Uuid) -> AppResult<u64>;
}

/// Resolves an inbound credential to an authenticated user id. The core
/// trusts this resolution and re-derives identity from the connection
/// context on every event; payload-supplied identities are never used.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> AppResult<Uuid>;
}

/// One-shot conversation summarization.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, history: &[Message]) -> AppResult<String>;
}

/// Development-only resolver: the bearer token is the user id itself.
///
/// Stands in for a real identity service during local development and
/// tests; do not deploy.
pub struct InsecureTokenResolver;

impl InsecureTokenResolver {
    pub fn new() -> Self {
        tracing::warn!("identity: insecure token resolver active (token == user id)");
        Self
    }
}

impl Default for InsecureTokenResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityResolver for InsecureTokenResolver {
    async fn resolve(&self, token: &str) -> AppResult<Uuid> {
        Uuid::parse_str(token.trim()).map_err(|_| AppError::Unauthorized)
    }
}
