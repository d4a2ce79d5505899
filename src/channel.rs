//! Per-connection outbound queue.
//!
//! Each connected user owns one bounded queue; the websocket session drains
//! it into the socket, which preserves FIFO order per channel. Pushing is
//! fire-and-forget: a slow receiver never blocks the router.

use tokio::sync::mpsc;

use crate::events::ServerEvent;

/// Outcome of a fire-and-forget push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    /// Queue full or receiver gone. Treated identically to a routing miss.
    Dropped,
}

/// Send half of a connection's outbound queue.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    sender: mpsc::Sender<ServerEvent>,
}

impl ChannelHandle {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Push an event without waiting. A full queue drops the newest event;
    /// a closed receiver means the connection is already gone.
    pub fn push(&self, event: ServerEvent) -> PushOutcome {
        match self.sender.try_send(event) {
            Ok(()) => PushOutcome::Delivered,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::debug!(event = event.event_type(), "outbound queue full, dropping");
                PushOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => PushOutcome::Dropped,
        }
    }
}
