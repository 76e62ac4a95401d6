//! Gemini Live API client implementation.
//!
//! This module provides the Gemini Live client that implements the `BaseRealtime`
//! trait using Google's `BidiGenerateContent` WebSocket API.
//!
//! # API Reference
//!
//! - Endpoint: `wss://generativelanguage.googleapis.com/ws/...BidiGenerateContent?key=<key>`
//! - Protocol: WebSocket with JSON messages (text or binary frames)
//! - Audio in: PCM 16-bit, 16kHz, mono, base64 encoded
//! - Audio out: PCM 16-bit, 24kHz, mono, base64 encoded
//!
//! The session is usable only after the server answers the `setup` message
//! with `setupComplete`; [`GeminiLive::connect`] waits for that acknowledgement.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use url::Url;

use super::config::{
    GEMINI_DEFAULT_MODEL, GEMINI_DEFAULT_SETUP_TIMEOUT_MS, GEMINI_INPUT_SAMPLE_RATE,
    GEMINI_LIVE_URL, GEMINI_OUTPUT_SAMPLE_RATE, Modality, model_resource_name,
};
use super::messages::{ClientMessage, ServerMessage};
use crate::core::realtime::base::{
    BaseRealtime, BoxedRealtime, ConnectionState, RealtimeAudioInput, RealtimeConfig,
    RealtimeConnector, RealtimeError, RealtimeEvent, RealtimeEventSender, RealtimeResult,
};

/// Channel capacity for WebSocket message sending.
const WS_CHANNEL_CAPACITY: usize = 256;

/// How long `disconnect` waits for the writer task to send its close frame.
const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

/// Work items for the writer task.
#[derive(Debug)]
enum Outgoing {
    /// Serialized client message
    Text(String),
    /// Send a close frame and stop the writer
    Close,
}

/// Result of decoding one upstream frame.
enum Frame {
    Server(Box<ServerMessage>),
    Closed(Option<String>),
    Skip,
}

// =============================================================================
// Gemini Live Client
// =============================================================================

/// Gemini Live API client.
///
/// One instance owns one upstream session and two socket tasks. Outgoing
/// messages go through a bounded channel to the writer, so sends never
/// interleave. The reader emits events in arrival order and may wait on a
/// full event sink without holding up the writer.
pub struct GeminiLive {
    /// Configuration
    config: RealtimeConfig,
    /// Fully qualified model name
    model: String,
    /// Requested response modalities
    modalities: Vec<Modality>,
    /// Endpoint without credentials
    endpoint: Url,
    /// Upper bound on the setup handshake
    setup_timeout: Duration,
    /// Connection state (shared with reader task)
    state: Arc<RwLock<ConnectionState>>,
    /// Connected flag for fast checks (shared with reader task)
    connected: Arc<AtomicBool>,
    /// Set before a local disconnect so the task does not report a remote close
    intentional_disconnect: Arc<AtomicBool>,
    /// Sender to the writer task
    ws_sender: Option<mpsc::Sender<Outgoing>>,
    /// Socket writer task
    writer_handle: Option<JoinHandle<()>>,
    /// Socket reader task
    reader_handle: Option<JoinHandle<()>>,
}

impl GeminiLive {
    /// Get the fully qualified model name sent at setup.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the configured setup timeout.
    pub fn setup_timeout(&self) -> Duration {
        self.setup_timeout
    }

    /// Build the WebSocket URL with the API key query parameter.
    fn build_ws_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key);
        url
    }

    /// Build the setup message for this session.
    fn build_setup(&self) -> ClientMessage {
        let instruction = self
            .config
            .instructions
            .as_deref()
            .filter(|text| !text.trim().is_empty());
        ClientMessage::setup(self.model.clone(), self.modalities.clone(), instruction)
    }

    /// Serialize a message and queue it for the writer task.
    async fn send_message(&self, message: ClientMessage) -> RealtimeResult<()> {
        let sender = self.ws_sender.as_ref().ok_or(RealtimeError::NotConnected)?;
        let json = serde_json::to_string(&message)
            .map_err(|e| RealtimeError::SerializationError(e.to_string()))?;
        sender
            .send(Outgoing::Text(json))
            .await
            .map_err(|_| RealtimeError::NotConnected)
    }

    /// Read frames until the server acknowledges setup.
    ///
    /// A close frame at this stage is a rejection and its reason is returned
    /// unchanged.
    async fn await_setup_complete<S>(stream: &mut S) -> RealtimeResult<()>
    where
        S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    {
        while let Some(msg) = stream.next().await {
            let msg = msg.map_err(|e| RealtimeError::WebSocketError(e.to_string()))?;
            match Self::decode_frame(msg) {
                Frame::Server(server) if server.is_setup_complete() => return Ok(()),
                Frame::Server(_) | Frame::Skip => {
                    tracing::trace!("Ignoring Gemini message received before setupComplete");
                }
                Frame::Closed(reason) => {
                    return Err(RealtimeError::SetupRejected(reason.unwrap_or_else(|| {
                        "Gemini Live closed the connection during setup".to_string()
                    })));
                }
            }
        }

        Err(RealtimeError::ConnectionFailed(
            "Connection ended before setup completed".to_string(),
        ))
    }

    /// Decode one upstream frame. JSON may arrive in text or binary frames.
    fn decode_frame(msg: Message) -> Frame {
        let parsed = match msg {
            Message::Text(text) => serde_json::from_str::<ServerMessage>(text.as_str()),
            Message::Binary(data) => serde_json::from_slice::<ServerMessage>(&data),
            Message::Close(frame) => {
                let reason = frame
                    .map(|f| f.reason.to_string())
                    .filter(|reason| !reason.is_empty());
                return Frame::Closed(reason);
            }
            _ => return Frame::Skip,
        };

        match parsed {
            Ok(server) => Frame::Server(Box::new(server)),
            Err(e) => {
                tracing::warn!("Failed to parse Gemini server message: {}", e);
                Frame::Skip
            }
        }
    }
}

#[async_trait]
impl BaseRealtime for GeminiLive {
    fn new(config: RealtimeConfig) -> RealtimeResult<Self> {
        if config.api_key.is_empty() {
            return Err(RealtimeError::AuthenticationFailed(
                "API key is required".to_string(),
            ));
        }

        let model = if config.model.is_empty() {
            model_resource_name(GEMINI_DEFAULT_MODEL)
        } else {
            model_resource_name(&config.model)
        };

        let endpoint = config.endpoint.as_deref().unwrap_or(GEMINI_LIVE_URL);
        let endpoint = Url::parse(endpoint).map_err(|e| {
            RealtimeError::InvalidConfiguration(format!("Invalid endpoint '{endpoint}': {e}"))
        })?;
        if !matches!(endpoint.scheme(), "ws" | "wss") {
            return Err(RealtimeError::InvalidConfiguration(format!(
                "Endpoint must use ws or wss, got '{}'",
                endpoint.scheme()
            )));
        }

        let modalities = match config.modalities.as_ref() {
            Some(list) if !list.is_empty() => list
                .iter()
                .map(|m| Modality::from_str_or_default(m))
                .collect(),
            _ => vec![Modality::default()],
        };

        let setup_timeout = Duration::from_millis(
            config
                .setup_timeout_ms
                .unwrap_or(GEMINI_DEFAULT_SETUP_TIMEOUT_MS),
        );

        Ok(Self {
            config,
            model,
            modalities,
            endpoint,
            setup_timeout,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            connected: Arc::new(AtomicBool::new(false)),
            intentional_disconnect: Arc::new(AtomicBool::new(false)),
            ws_sender: None,
            writer_handle: None,
            reader_handle: None,
        })
    }

    async fn connect(&mut self, events: RealtimeEventSender) -> RealtimeResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            return Ok(());
        }

        self.intentional_disconnect.store(false, Ordering::SeqCst);
        *self.state.write().await = ConnectionState::Connecting;

        let url = self.build_ws_url();
        let (ws_stream, _response) = match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok(ok) => ok,
            Err(e) => {
                *self.state.write().await = ConnectionState::Failed;
                return Err(match e {
                    tungstenite::Error::Http(response)
                        if matches!(response.status().as_u16(), 401 | 403) =>
                    {
                        RealtimeError::AuthenticationFailed(format!(
                            "Gemini Live rejected the API key ({})",
                            response.status()
                        ))
                    }
                    other => RealtimeError::ConnectionFailed(other.to_string()),
                });
            }
        };

        tracing::debug!("WebSocket connected to Gemini Live, sending setup");

        let (mut ws_sink, mut ws_stream) = ws_stream.split();

        let setup = serde_json::to_string(&self.build_setup())
            .map_err(|e| RealtimeError::SerializationError(e.to_string()))?;
        if let Err(e) = ws_sink.send(Message::Text(setup.into())).await {
            *self.state.write().await = ConnectionState::Failed;
            return Err(RealtimeError::WebSocketError(e.to_string()));
        }

        let ack =
            tokio::time::timeout(self.setup_timeout, Self::await_setup_complete(&mut ws_stream))
                .await;
        match ack {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!("Gemini Live setup failed: {}", e);
                *self.state.write().await = ConnectionState::Failed;
                return Err(e);
            }
            Err(_) => {
                let _ = ws_sink.send(Message::Close(None)).await;
                *self.state.write().await = ConnectionState::Failed;
                return Err(RealtimeError::Timeout(format!(
                    "setupComplete not received within {}ms",
                    self.setup_timeout.as_millis()
                )));
            }
        }

        tracing::info!("Connected to Gemini Live API (model: {})", self.model);

        let (tx, mut rx) = mpsc::channel::<Outgoing>(WS_CHANNEL_CAPACITY);
        self.ws_sender = Some(tx);

        self.connected.store(true, Ordering::SeqCst);
        *self.state.write().await = ConnectionState::Connected;

        // Writer owns the sink half and never touches the event channel
        let writer_handle = tokio::spawn(async move {
            while let Some(outgoing) = rx.recv().await {
                match outgoing {
                    Outgoing::Text(json) => {
                        if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                            tracing::error!("Failed to send Gemini message: {}", e);
                            return;
                        }
                    }
                    Outgoing::Close => break,
                }
            }
            let _ = ws_sink.send(Message::Close(None)).await;
            tracing::debug!("Gemini Live writer task ended");
        });

        // Reader: classifies server messages into events, in arrival order.
        let state = self.state.clone();
        let connected = self.connected.clone();
        let intentional_disconnect = self.intentional_disconnect.clone();

        let reader_handle = tokio::spawn(async move {
            let mut close_reason: Option<String> = None;

            'session: while let Some(incoming) = ws_stream.next().await {
                match incoming {
                    Ok(msg) => match Self::decode_frame(msg) {
                        Frame::Server(server) => {
                            if let Some(go_away) = server.go_away.as_ref() {
                                tracing::warn!(
                                    "Gemini Live goAway received (time left: {})",
                                    go_away.time_left.as_deref().unwrap_or("unknown")
                                );
                            }
                            for event in server.into_events() {
                                if events.send(event).await.is_err() {
                                    tracing::debug!("Event receiver dropped, ending Gemini reader");
                                    break 'session;
                                }
                            }
                        }
                        Frame::Closed(reason) => {
                            tracing::info!(
                                "Gemini Live closed the session: {}",
                                reason.as_deref().unwrap_or("no reason")
                            );
                            close_reason = reason;
                            break 'session;
                        }
                        Frame::Skip => {}
                    },
                    Err(e) => {
                        tracing::error!("Gemini WebSocket error: {}", e);
                        if !intentional_disconnect.load(Ordering::SeqCst) {
                            let _ = events.send(RealtimeEvent::Error(e.to_string())).await;
                        }
                        break 'session;
                    }
                }
            }

            connected.store(false, Ordering::SeqCst);

            if intentional_disconnect.load(Ordering::SeqCst) {
                *state.write().await = ConnectionState::Disconnected;
            } else {
                *state.write().await = ConnectionState::Failed;
                let _ = events
                    .send(RealtimeEvent::Closed {
                        reason: close_reason,
                    })
                    .await;
            }

            tracing::debug!("Gemini Live reader task ended");
        });

        self.writer_handle = Some(writer_handle);
        self.reader_handle = Some(reader_handle);
        Ok(())
    }

    async fn disconnect(&mut self) -> RealtimeResult<()> {
        self.intentional_disconnect.store(true, Ordering::SeqCst);
        let was_connected = self.connected.swap(false, Ordering::SeqCst);

        if let Some(sender) = self.ws_sender.take() {
            // A full queue is fine: dropping the sender also ends the writer.
            let _ = sender.try_send(Outgoing::Close);
        }

        if let Some(mut handle) = self.writer_handle.take()
            && tokio::time::timeout(DISCONNECT_GRACE, &mut handle)
                .await
                .is_err()
        {
            tracing::warn!("Gemini Live writer task did not stop in time, aborting");
            handle.abort();
        }

        // The reader may be parked on a full event sink
        if let Some(handle) = self.reader_handle.take() {
            handle.abort();
        }

        *self.state.write().await = ConnectionState::Disconnected;

        if was_connected {
            tracing::info!("Disconnected from Gemini Live API");
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn get_connection_state(&self) -> ConnectionState {
        match self.state.try_read() {
            Ok(state) => *state,
            Err(_) if self.is_ready() => ConnectionState::Connected,
            Err(_) => ConnectionState::Disconnected,
        }
    }

    async fn send_audio(&mut self, audio: RealtimeAudioInput) -> RealtimeResult<()> {
        if !self.is_ready() {
            return Err(RealtimeError::NotConnected);
        }

        self.send_message(ClientMessage::audio(audio.data, Some(audio.mime_type)))
            .await
    }

    async fn send_text(&mut self, text: &str) -> RealtimeResult<()> {
        if !self.is_ready() {
            return Err(RealtimeError::NotConnected);
        }

        self.send_message(ClientMessage::user_text(text)).await
    }

    async fn end_turn(&mut self) -> RealtimeResult<()> {
        if !self.is_ready() {
            return Err(RealtimeError::NotConnected);
        }

        self.send_message(ClientMessage::end_turn()).await
    }

    fn get_provider_info(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": "gemini",
            "api": "Gemini Live",
            "model": self.model,
            "endpoint": self.endpoint.as_str(),
            "modalities": self.modalities.iter().map(Modality::as_str).collect::<Vec<_>>(),
            "input_sample_rate": GEMINI_INPUT_SAMPLE_RATE,
            "output_sample_rate": GEMINI_OUTPUT_SAMPLE_RATE,
        })
    }
}

impl Drop for GeminiLive {
    fn drop(&mut self) {
        if let Some(handle) = self.writer_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.reader_handle.take() {
            handle.abort();
        }
    }
}

// =============================================================================
// Connector
// =============================================================================

/// Creates [`GeminiLive`] sessions for the relay.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiLiveConnector;

impl RealtimeConnector for GeminiLiveConnector {
    fn create(&self, config: RealtimeConfig) -> RealtimeResult<BoxedRealtime> {
        Ok(Box::new(GeminiLive::new(config)?))
    }
}
