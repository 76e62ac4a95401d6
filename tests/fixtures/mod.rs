//! Test Fixtures Module
//!
//! Starts the relay on an ephemeral port and drives it with a
//! tokio-tungstenite client.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use live_relay::core::realtime::RealtimeConnector;
use live_relay::{AppState, ServerConfig, routes};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a test waits for any single frame.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a relay under test: no static files, a dummy key.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.static_dir = None;
    config.google_api_key = Some("test-key".to_string());
    config.setup_timeout_seconds = 2;
    config
}

/// Serve the relay on an ephemeral port.
pub async fn spawn_app(
    config: ServerConfig,
    connector: Arc<dyn RealtimeConnector>,
) -> (SocketAddr, Arc<AppState>) {
    let state = AppState::with_connector(config, connector);
    let app = routes::create_app(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind relay listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Open a client socket on `/realtime`.
pub async fn connect_client(addr: SocketAddr) -> Client {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/realtime"))
        .await
        .expect("Failed to connect to relay");
    ws
}

/// Send a JSON text frame.
pub async fn send_json(ws: &mut Client, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next JSON message from the relay, skipping pings.
pub async fn next_json(ws: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for relay message")
            .expect("Relay socket ended")
            .expect("Relay socket error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Relay sent invalid JSON");
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Expected a text frame, got {other:?}"),
        }
    }
}

/// Assert that the relay closes the socket without sending more messages.
pub async fn expect_closed(ws: &mut Client) {
    loop {
        let next = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for close");
        match next {
            None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            Some(Ok(other)) => panic!("Expected close, got {other:?}"),
        }
    }
}

/// Poll until the relay has no registered connections.
pub async fn wait_until_idle(state: &AppState) -> bool {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if state.connections.is_empty() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
