//! WebSocket session handling.
//!
//! One session per authenticated user. The session registers an outbound
//! queue, forwards queued events to the socket, and dispatches inbound
//! client events through the router and delivery tracker. A replacement
//! connection closes this one by dropping its queue sender.

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::events::{ClientEvent, ServerEvent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    token: Option<String>,
}

/// Upgrade handler. The token comes from the `token` query parameter or an
/// `Authorization: Bearer` header; authentication happens before the
/// upgrade so a bad credential is an HTTP 401, not a doomed socket.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let header_token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned);
    let token = params
        .token
        .or(header_token)
        .ok_or(AppError::Unauthorized)?;

    let user_id = state.identity.resolve(&token).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(state, user_id, socket)))
}

async fn handle_socket(state: AppState, user_id: Uuid, socket: WebSocket) {
    let (connection_id, mut outbound_rx) = state.registry.register(user_id).await;
    tracing::info!(%user_id, "websocket session opened");

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            queued = outbound_rx.recv() => {
                match queued {
                    Some(event) => {
                        let payload = match event.to_json() {
                            Ok(payload) => payload,
                            Err(error) => {
                                tracing::error!(%error, "failed to serialize outbound event");
                                continue;
                            }
                        };
                        if sink.send(WsMessage::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    // Queue sender dropped: this session was replaced.
                    None => {
                        tracing::debug!(%user_id, "session superseded by a newer connection");
                        break;
                    }
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(WsMessage::Text(raw))) => {
                        handle_client_event(&state, user_id, &raw).await;
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        tracing::debug!(%user_id, %error, "websocket read error");
                        break;
                    }
                }
            }
        }
    }

    state.registry.remove(user_id, connection_id).await;
    tracing::info!(%user_id, "websocket session closed");
}

/// A malformed payload is answered on the session's own channel and never
/// tears the connection down.
async fn handle_client_event(state: &AppState, user_id: Uuid, raw: &str) {
    let event = match serde_json::from_str::<ClientEvent>(raw) {
        Ok(event) => event,
        Err(error) => {
            tracing::warn!(%user_id, %error, "unparseable client event");
            if let Some(channel) = state.registry.lookup(user_id).await {
                channel.push(ServerEvent::Error {
                    detail: format!("unrecognized event: {error}"),
                });
            }
            return;
        }
    };

    match event {
        ClientEvent::TypingStarted { receiver_id } => {
            state.router.route_typing(user_id, receiver_id, true).await;
        }
        ClientEvent::TypingStopped { receiver_id } => {
            state.router.route_typing(user_id, receiver_id, false).await;
        }
        ClientEvent::MessagesSeen { peer_id } => {
            if let Err(error) = state.delivery.acknowledge(user_id, peer_id).await {
                tracing::warn!(%user_id, %peer_id, %error, "seen acknowledgment failed");
            }
        }
    }
}
