//! Client-side state reconciler.
//!
//! Owns everything a chat UI renders: the roster, the online set, the open
//! conversation, unread counters, typing indicators and the optional
//! summary. Server events mutate this state through [`Reconciler::apply`];
//! user actions go out through the [`ChatApi`] collaborator and the
//! outbound websocket queue.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::client::api::ChatApi;
use crate::error::{AppError, AppResult};
use crate::events::{ClientEvent, ServerEvent};
use crate::models::{Message, NewMessage, RosterEntry};

pub struct Reconciler {
    api: Arc<dyn ChatApi>,
    /// Events destined for the websocket writer task.
    outbound: mpsc::UnboundedSender<ClientEvent>,
    self_id: Uuid,

    users: Vec<RosterEntry>,
    online: HashSet<Uuid>,
    open_peer: Option<Uuid>,
    messages: Vec<Message>,
    /// Last typing.started instant per peer; entries expire client-side.
    typing: HashMap<Uuid, Instant>,
    unread: HashMap<Uuid, u32>,
    summary: Option<String>,
}

impl Reconciler {
    pub fn new(
        api: Arc<dyn ChatApi>,
        outbound: mpsc::UnboundedSender<ClientEvent>,
        self_id: Uuid,
    ) -> Self {
        Self {
            api,
            outbound,
            self_id,
            users: Vec::new(),
            online: HashSet::new(),
            open_peer: None,
            messages: Vec::new(),
            typing: HashMap::new(),
            unread: HashMap::new(),
            summary: None,
        }
    }

    pub async fn load_roster(&mut self) -> AppResult<()> {
        self.users = self.api.fetch_roster().await?;
        Ok(())
    }

    /// Fold one server event into local state.
    pub fn apply(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::MessageNew { message } => self.apply_message(message),
            ServerEvent::TypingStarted { sender_id } => {
                self.typing.insert(sender_id, Instant::now());
            }
            ServerEvent::TypingStopped { sender_id } => {
                self.typing.remove(&sender_id);
            }
            ServerEvent::MessagesSeen { seen_by } => {
                // Only the open conversation renders seen markers; other
                // conversations reconcile from history on open.
                if self.open_peer == Some(seen_by) {
                    for message in &mut self.messages {
                        if message.sender_id == self.self_id {
                            message.seen = true;
                        }
                    }
                }
            }
            ServerEvent::PresenceUpdate { online_user_ids } => {
                self.online = online_user_ids.into_iter().collect();
            }
            ServerEvent::Error { detail } => {
                tracing::warn!(%detail, "server rejected an event");
            }
        }
    }

    fn apply_message(&mut self, message: Message) {
        let sender = message.sender_id;
        self.typing.remove(&sender);
        if self.open_peer == Some(sender) {
            self.messages.push(message);
            // Viewing the conversation acknowledges it immediately.
            self.emit_seen(sender);
        } else {
            *self.unread.entry(sender).or_insert(0) += 1;
        }
    }

    /// Switch the open conversation to `peer`: clear its unread counter,
    /// reload history from the source of truth, then acknowledge it.
    pub async fn open_conversation(&mut self, peer: Uuid) -> AppResult<()> {
        self.unread.remove(&peer);
        self.summary = None;
        let history = self.api.fetch_history(peer).await?;
        self.open_peer = Some(peer);
        self.messages = history;
        self.emit_seen(peer);
        Ok(())
    }

    pub fn close_conversation(&mut self) {
        if let Some(peer) = self.open_peer.take() {
            let _ = self.outbound.send(ClientEvent::TypingStopped { receiver_id: peer });
        }
        self.messages.clear();
        self.summary = None;
    }

    pub async fn send_message(&mut self, body: NewMessage) -> AppResult<()> {
        let peer = self.open_peer.ok_or(AppError::NotFound)?;
        body.validate()?;
        let stored = self.api.send_message(peer, body).await?;
        self.messages.push(stored);
        Ok(())
    }

    pub async fn request_summary(&mut self) -> AppResult<()> {
        let peer = self.open_peer.ok_or(AppError::NotFound)?;
        self.summary = Some(self.api.summarize(peer).await?);
        Ok(())
    }

    pub fn start_typing(&self) {
        if let Some(peer) = self.open_peer {
            let _ = self.outbound.send(ClientEvent::TypingStarted { receiver_id: peer });
        }
    }

    pub fn stop_typing(&self) {
        if let Some(peer) = self.open_peer {
            let _ = self.outbound.send(ClientEvent::TypingStopped { receiver_id: peer });
        }
    }

    /// Drop typing entries older than `ttl`. A lost typing.stopped event
    /// therefore cannot pin the indicator forever.
    pub fn expire_typing(&mut self, ttl: Duration) {
        let now = Instant::now();
        self.typing
            .retain(|_, started| now.duration_since(*started) < ttl);
    }

    /// Whether the open conversation's peer is currently typing.
    pub fn is_peer_typing(&self) -> bool {
        self.open_peer
            .is_some_and(|peer| self.typing.contains_key(&peer))
    }

    pub fn is_online(&self, user: Uuid) -> bool {
        self.online.contains(&user)
    }

    pub fn unread_count(&self, peer: Uuid) -> u32 {
        self.unread.get(&peer).copied().unwrap_or(0)
    }

    pub fn users(&self) -> &[RosterEntry] {
        &self.users
    }

    pub fn open_peer(&self) -> Option<Uuid> {
        self.open_peer
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn emit_seen(&self, peer: Uuid) {
        let _ = self.outbound.send(ClientEvent::MessagesSeen { peer_id: peer });
    }
}
