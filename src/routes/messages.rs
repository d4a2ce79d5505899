//! Conversation endpoints: send, history, seen acknowledgment, summary.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::{Message, NewMessage};
use crate::state::AppState;

/// Persist a message, then best-effort push it to the recipient. The
/// response body is the stored message; the sender's client appends it from
/// here instead of waiting for an echo that never comes.
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(sender): AuthUser,
    Path(peer_id): Path<Uuid>,
    Json(payload): Json<NewMessage>,
) -> AppResult<Json<Message>> {
    if peer_id == sender {
        return Err(AppError::BadRequest(
            "cannot send a message to yourself".into(),
        ));
    }
    payload.validate()?;

    let message = Message::new(sender, peer_id, payload);
    let stored = state.store.persist_message(message).await?;
    state.router.route_message(&stored).await;

    tracing::info!(message_id = %stored.id, %sender, receiver = %peer_id, "message sent");
    Ok(Json(stored))
}

pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(peer_id): Path<Uuid>,
) -> AppResult<Json<Vec<Message>>> {
    let history = state.store.load_history(user, peer_id).await?;
    Ok(Json(history))
}

/// Acknowledge every message from `peer_id` as seen.
pub async fn mark_seen(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(peer_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let updated = state.delivery.acknowledge(user, peer_id).await?;
    Ok(Json(json!({ "updated": updated })))
}

/// Summarize the trailing window of the conversation via the configured
/// collaborator.
pub async fn summarize(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(peer_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let summarizer = state
        .summarizer
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("summarization not configured".into()))?;

    let history = state.store.load_history(user, peer_id).await?;
    if history.len() < state.config.summary_min_messages {
        return Err(AppError::BadRequest(
            "not enough messages to summarize".into(),
        ));
    }

    let window_start = history.len().saturating_sub(state.config.summary_window);
    let summary = summarizer.summarize(&history[window_start..]).await?;
    Ok(Json(json!({ "summary": summary })))
}
