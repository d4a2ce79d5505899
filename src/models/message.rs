use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A persisted two-party chat message.
///
/// `seen` starts false and only ever transitions forward to true, in bulk,
/// when the receiver acknowledges the sender's messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub seen: bool,
}

impl Message {
    pub fn new(sender_id: Uuid, receiver_id: Uuid, body: NewMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            text: body.text,
            image_url: body.image_url,
            created_at: Utc::now(),
            seen: false,
        }
    }
}

/// Client-supplied message payload. Sender and receiver come from the
/// authenticated request context, never from this body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewMessage {
    /// Exactly one of `text` / `image_url` must carry content.
    pub fn validate(&self) -> AppResult<()> {
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        let has_image = self
            .image_url
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty());

        match (has_text, has_image) {
            (true, false) | (false, true) => Ok(()),
            (false, false) => Err(AppError::BadRequest(
                "message requires text or an image".into(),
            )),
            (true, true) => Err(AppError::BadRequest(
                "message cannot carry both text and an image".into(),
            )),
        }
    }
}

/// Roster entry as served by the user directory collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: Uuid,
    pub username: String,
}
