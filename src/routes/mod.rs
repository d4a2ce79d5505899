pub mod messages;
pub mod ws;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::middleware::auth::auth_middleware;
use crate::middleware::logging::add_tracing;
use crate::state::AppState;

/// Assemble the HTTP surface.
///
/// Message endpoints require a bearer token; the websocket route
/// authenticates inside its own handler so browser clients can pass the
/// token as a query parameter.
pub fn build_router(state: AppState) -> Router {
    let secured = Router::new()
        .route(
            "/messages/:peer_id",
            post(messages::send_message).get(messages::get_history),
        )
        .route("/messages/:peer_id/seen", post(messages::mark_seen))
        .route("/messages/:peer_id/summary", get(messages::summarize))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let api = secured.route("/ws", get(ws::ws_handler));

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state);

    add_tracing(router)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
