//! WebSocket wire contract.
//!
//! All events follow the "object.action" naming convention and carry a flat
//! JSON structure tagged by `type`. Inbound events deliberately carry no
//! sender identity: the authenticated session supplies it at dispatch time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Message;

/// Inbound events from a connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "typing.started")]
    TypingStarted { receiver_id: Uuid },

    #[serde(rename = "typing.stopped")]
    TypingStopped { receiver_id: Uuid },

    /// "I have viewed all of this peer's messages up to now."
    #[serde(rename = "messages.seen")]
    MessagesSeen { peer_id: Uuid },
}

/// Outbound events pushed to a connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "message.new")]
    MessageNew { message: Message },

    #[serde(rename = "typing.started")]
    TypingStarted { sender_id: Uuid },

    #[serde(rename = "typing.stopped")]
    TypingStopped { sender_id: Uuid },

    #[serde(rename = "messages.seen")]
    MessagesSeen { seen_by: Uuid },

    #[serde(rename = "presence.update")]
    PresenceUpdate { online_user_ids: Vec<Uuid> },

    /// Sent back to the originating channel only, when its payload could not
    /// be parsed. The connection stays open.
    #[serde(rename = "error")]
    Error { detail: String },
}

impl ServerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageNew { .. } => "message.new",
            Self::TypingStarted { .. } => "typing.started",
            Self::TypingStopped { .. } => "typing.stopped",
            Self::MessagesSeen { .. } => "messages.seen",
            Self::PresenceUpdate { .. } => "presence.update",
            Self::Error { .. } => "error",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewMessage;

    #[test]
    fn server_event_is_tagged_by_type() {
        let message = Message::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NewMessage {
                text: Some("hi".into()),
                image_url: None,
            },
        );
        let payload = ServerEvent::MessageNew { message }.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(parsed["type"], "message.new");
        assert!(parsed["message"]["id"].is_string());
    }

    #[test]
    fn presence_update_carries_online_set() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let payload = ServerEvent::PresenceUpdate {
            online_user_ids: vec![a, b],
        }
        .to_json()
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(parsed["type"], "presence.update");
        assert_eq!(parsed["online_user_ids"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn client_event_round_trips() {
        let peer = Uuid::new_v4();
        let raw = format!(r#"{{"type":"messages.seen","peer_id":"{peer}"}}"#);
        let evt: ClientEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(evt, ClientEvent::MessagesSeen { peer_id: peer });
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let raw = r#"{"type":"message.selfdestruct","peer_id":"x"}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }
}
