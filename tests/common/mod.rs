#![allow(dead_code)]

//! Shared harness for integration tests: boots the real service on an
//! ephemeral port and provides websocket/HTTP helpers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use chat_presence_service::collaborators::{InsecureTokenResolver, Summarizer};
use chat_presence_service::config::Config;
use chat_presence_service::error::AppResult;
use chat_presence_service::events::{ClientEvent, ServerEvent};
use chat_presence_service::models::Message;
use chat_presence_service::presence::PresencePublisher;
use chat_presence_service::routes::build_router;
use chat_presence_service::state::AppState;
use chat_presence_service::storage::memory::MemoryStore;

pub struct TestApp {
    pub addr: String,
    pub client: reqwest::Client,
}

/// Canned summarizer so summary tests have a deterministic collaborator.
pub struct CannedSummarizer;

#[async_trait]
impl Summarizer for CannedSummarizer {
    async fn summarize(&self, history: &[Message]) -> AppResult<String> {
        Ok(format!("{} messages exchanged", history.len()))
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_summarizer(Some(Arc::new(CannedSummarizer))).await
}

pub async fn spawn_app_with_summarizer(summarizer: Option<Arc<dyn Summarizer>>) -> TestApp {
    let state = AppState::new(
        Config::test_defaults(),
        Arc::new(MemoryStore::new()),
        Arc::new(InsecureTokenResolver::new()),
        summarizer,
    );
    PresencePublisher::new(state.registry.clone()).spawn();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr").to_string();

    let app = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestApp {
        addr,
        client: reqwest::Client::new(),
    }
}

pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

pub struct WsSession {
    pub user_id: Uuid,
    pub writer: WsWriter,
    pub reader: WsReader,
}

impl WsSession {
    /// Connect as `user_id`; the insecure resolver treats the id itself as
    /// the token.
    pub async fn connect(app: &TestApp, user_id: Uuid) -> Self {
        let url = format!("ws://{}/api/v1/ws?token={}", app.addr, user_id);
        let (socket, _) = connect_async(url).await.expect("websocket connect");
        let (writer, reader) = socket.split();
        Self {
            user_id,
            writer,
            reader,
        }
    }

    pub async fn send(&mut self, event: &ClientEvent) {
        let payload = serde_json::to_string(event).expect("serialize client event");
        self.writer
            .send(WsMessage::Text(payload))
            .await
            .expect("send client event");
    }

    pub async fn send_raw(&mut self, raw: &str) {
        self.writer
            .send(WsMessage::Text(raw.to_string()))
            .await
            .expect("send raw frame");
    }

    /// Read frames until one matches `want` (by event type name), skipping
    /// interleaved presence updates and other events. Panics on timeout.
    pub async fn next_event_of(&mut self, want: &str) -> ServerEvent {
        let deadline = Duration::from_secs(3);
        let fut = async {
            loop {
                let frame = self.reader.next().await.expect("socket open");
                let frame = frame.expect("read frame");
                if let WsMessage::Text(raw) = frame {
                    let event: ServerEvent =
                        serde_json::from_str(&raw).expect("parse server event");
                    if event.event_type() == want {
                        return event;
                    }
                }
            }
        };
        tokio::time::timeout(deadline, fut)
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {want}"))
    }

    /// Assert no event of type `unwanted` arrives within `window`.
    pub async fn assert_silence(&mut self, unwanted: &str, window: Duration) {
        let fut = async {
            loop {
                match self.reader.next().await {
                    Some(Ok(WsMessage::Text(raw))) => {
                        let event: ServerEvent =
                            serde_json::from_str(&raw).expect("parse server event");
                        if event.event_type() == unwanted {
                            panic!("unexpected {unwanted} event");
                        }
                    }
                    Some(Ok(_)) => {}
                    _ => return,
                }
            }
        };
        let _ = tokio::time::timeout(window, fut).await;
    }
}

pub async fn post_message(app: &TestApp, sender: Uuid, peer: Uuid, text: &str) -> Message {
    let response = app
        .client
        .post(format!("http://{}/api/v1/messages/{}", app.addr, peer))
        .bearer_auth(sender)
        .json(&serde_json::json!({ "text": text }))
        .send()
        .await
        .expect("send message request");
    assert!(
        response.status().is_success(),
        "send failed: {}",
        response.status()
    );
    response.json().await.expect("parse stored message")
}

pub async fn fetch_history(app: &TestApp, user: Uuid, peer: Uuid) -> Vec<Message> {
    let response = app
        .client
        .get(format!("http://{}/api/v1/messages/{}", app.addr, peer))
        .bearer_auth(user)
        .send()
        .await
        .expect("history request");
    assert!(response.status().is_success());
    response.json().await.expect("parse history")
}

pub async fn post_seen(app: &TestApp, user: Uuid, peer: Uuid) -> u64 {
    let response = app
        .client
        .post(format!(
            "http://{}/api/v1/messages/{}/seen",
            app.addr, peer
        ))
        .bearer_auth(user)
        .send()
        .await
        .expect("seen request");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("parse seen response");
    body["updated"].as_u64().expect("updated count")
}
