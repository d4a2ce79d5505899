use std::sync::Arc;

use chat_presence_service::collaborators::InsecureTokenResolver;
use chat_presence_service::config::Config;
use chat_presence_service::error::AppError;
use chat_presence_service::logging::init_tracing;
use chat_presence_service::presence::PresencePublisher;
use chat_presence_service::routes::build_router;
use chat_presence_service::state::AppState;
use chat_presence_service::storage::memory::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_tracing();

    let config = Config::from_env()?;
    let port = config.port;

    let state = AppState::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(InsecureTokenResolver::new()),
        None,
    );

    PresencePublisher::new(state.registry.clone()).spawn();

    let app = build_router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::StartServer(format!("bind {addr}: {e}")))?;

    tracing::info!(%addr, "chat presence service listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::StartServer(e.to_string()))?;

    Ok(())
}
