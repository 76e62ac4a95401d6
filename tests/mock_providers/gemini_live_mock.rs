//! Mock Gemini Live WebSocket server
//!
//! Accepts connections, records every JSON frame it receives and answers the
//! way the Live service does:
//! - the first frame must be `setup`; the reply depends on [`SetupReply`]
//! - a user turn with text "Hello" gets a text part "Hi there" (sent as a
//!   binary frame) followed by `turnComplete`
//! - a user turn with text "bye" makes the server close with "session ended"
//! - an audio frame is echoed back as model audio
//! - a bare `turnComplete` gets `interrupted` and `turnComplete`

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

/// How the mock answers the setup message.
#[derive(Debug, Clone, Copy)]
pub enum SetupReply {
    /// Send `setupComplete`
    Complete,
    /// Close the socket with this reason
    Reject(&'static str),
    /// Never answer
    Silent,
}

/// A running mock server.
pub struct MockGeminiServer {
    pub addr: SocketAddr,
    /// Every JSON frame received, across all connections
    pub received: Arc<Mutex<Vec<Value>>>,
    /// Query string of every upgrade request
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl MockGeminiServer {
    /// Start a server on an ephemeral port.
    pub async fn start(reply: SetupReply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock Gemini server");
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let queries = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let queries_clone = queries.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(
                    stream,
                    reply,
                    received_clone.clone(),
                    queries_clone.clone(),
                ));
            }
        });

        Self {
            addr,
            received,
            queries,
        }
    }

    /// Endpoint to hand to the client under test.
    pub fn url(&self) -> String {
        format!("ws://{}/live", self.addr)
    }

    /// Snapshot of received frames.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }

    /// Snapshot of upgrade query strings.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

async fn handle_connection(
    stream: TcpStream,
    reply: SetupReply,
    received: Arc<Mutex<Vec<Value>>>,
    queries: Arc<Mutex<Vec<String>>>,
) {
    let record_query = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        queries
            .lock()
            .unwrap()
            .push(req.uri().query().unwrap_or_default().to_string());
        Ok(resp)
    };

    let ws = match tokio_tungstenite::accept_hdr_async(stream, record_query).await {
        Ok(ws) => ws,
        Err(_) => return,
    };
    let (mut write, mut read) = ws.split();

    // Replies go through their own task; reading never waits on the peer
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<Message>();
    tokio::spawn(async move {
        while let Some(msg) = reply_rx.recv().await {
            let close = msg.is_close();
            if write.send(msg).await.is_err() || close {
                break;
            }
        }
    });

    // Setup handshake
    match read.next().await {
        Some(Ok(Message::Text(text))) => {
            if let Ok(value) = serde_json::from_str::<Value>(text.as_str()) {
                received.lock().unwrap().push(value);
            }
        }
        _ => return,
    }

    match reply {
        SetupReply::Complete => {
            let ack = json!({ "setupComplete": {} }).to_string();
            let _ = reply_tx.send(Message::Text(ack.into()));
        }
        SetupReply::Reject(reason) => {
            let _ = reply_tx.send(Message::Close(Some(CloseFrame {
                code: CloseCode::Policy,
                reason: reason.into(),
            })));
            return;
        }
        SetupReply::Silent => {
            // Hold the socket open until the client gives up
            while let Some(Ok(msg)) = read.next().await {
                if msg.is_close() {
                    break;
                }
            }
            return;
        }
    }

    while let Some(Ok(msg)) = read.next().await {
        let value = match msg {
            Message::Text(text) => match serde_json::from_str::<Value>(text.as_str()) {
                Ok(value) => value,
                Err(_) => continue,
            },
            Message::Close(_) => break,
            _ => continue,
        };
        received.lock().unwrap().push(value.clone());

        for reply in replies_for(&value) {
            let msg = match reply {
                Reply::Text(json) => Message::Text(json.to_string().into()),
                Reply::Binary(json) => Message::Binary(json.to_string().into_bytes().into()),
                Reply::Close(reason) => {
                    let _ = reply_tx.send(Message::Close(Some(CloseFrame {
                        code: CloseCode::Normal,
                        reason: reason.into(),
                    })));
                    return;
                }
            };
            if reply_tx.send(msg).is_err() {
                return;
            }
        }
    }
}

enum Reply {
    Text(Value),
    Binary(Value),
    Close(&'static str),
}

fn replies_for(message: &Value) -> Vec<Reply> {
    if let Some(audio) = message.pointer("/realtimeInput/audio/data") {
        return vec![Reply::Text(json!({
            "serverContent": {
                "modelTurn": {
                    "parts": [{
                        "inlineData": { "mimeType": "audio/pcm;rate=24000", "data": audio }
                    }]
                }
            }
        }))];
    }

    let Some(content) = message.get("clientContent") else {
        return Vec::new();
    };
    let user_text = content
        .pointer("/turns/0/parts/0/text")
        .and_then(Value::as_str);

    match user_text {
        Some("Hello") => vec![
            Reply::Binary(json!({
                "serverContent": { "modelTurn": { "parts": [{ "text": "Hi there" }] } }
            })),
            Reply::Text(json!({ "serverContent": { "turnComplete": true } })),
        ],
        Some("bye") => vec![Reply::Close("session ended")],
        Some(_) => vec![Reply::Text(
            json!({ "serverContent": { "turnComplete": true } }),
        )],
        None => vec![
            Reply::Text(json!({ "serverContent": { "interrupted": true } })),
            Reply::Text(json!({ "serverContent": { "turnComplete": true } })),
        ],
    }
}
