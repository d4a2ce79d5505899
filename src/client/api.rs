//! Client-side HTTP surface.
//!
//! The reconciler drives state through this trait so tests can supply a
//! scripted backend instead of a live server.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Message, NewMessage, RosterEntry};

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// All users the client may converse with.
    async fn fetch_roster(&self) -> AppResult<Vec<RosterEntry>>;

    /// Full conversation with `peer`, chronological order.
    async fn fetch_history(&self, peer: Uuid) -> AppResult<Vec<Message>>;

    /// Send a message; the response is the stored message, which the
    /// client appends locally instead of waiting for an echo.
    async fn send_message(&self, peer: Uuid, body: NewMessage) -> AppResult<Message>;

    async fn summarize(&self, peer: Uuid) -> AppResult<String>;
}
