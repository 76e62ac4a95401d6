//! Scripted realtime sessions
//!
//! `ScriptedConnector` hands out sessions that never touch the network. Each
//! call is appended to a shared log, and a few canned replies are pushed to
//! the event sink so the relay has something to forward:
//! - `send_text("Hello")` replies with text "Hi there" and a turn completion
//! - `send_text("fail")` returns a WebSocket error
//! - `send_text("flood")` pushes [`FLOOD_EVENTS`] text events before it
//!   returns, more than the relay's event buffer holds
//! - `end_turn()` replies with a turn completion
//!
//! Tests can also take the event sender via [`ScriptedConnector::upstream`]
//! and inject arbitrary events, including `Closed`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use live_relay::core::realtime::{
    BaseRealtime, BoxedRealtime, ConnectionState, RealtimeAudioInput, RealtimeConfig,
    RealtimeConnector, RealtimeError, RealtimeEvent, RealtimeEventSender, RealtimeResult,
};

/// Number of events emitted for a "flood" text turn.
pub const FLOOD_EVENTS: usize = 3000;

/// One observed call on a scripted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedCall {
    Connect,
    Audio { data: String, mime_type: String },
    Text(String),
    EndTurn,
    Disconnect,
}

#[derive(Default)]
struct Shared {
    calls: Mutex<Vec<ScriptedCall>>,
    configs: Mutex<Vec<RealtimeConfig>>,
    upstream: Mutex<Option<RealtimeEventSender>>,
}

/// Connector producing scripted sessions.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    shared: Arc<Shared>,
    connect_error: Option<RealtimeError>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `connect` fail with `error`.
    pub fn failing_with(error: RealtimeError) -> Self {
        Self {
            connect_error: Some(error),
            ..Self::default()
        }
    }

    /// Calls observed so far, across all sessions.
    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.shared.calls.lock().unwrap().clone()
    }

    /// Configurations sessions were created with.
    pub fn configs(&self) -> Vec<RealtimeConfig> {
        self.shared.configs.lock().unwrap().clone()
    }

    /// Event sender of the most recently connected session.
    pub fn upstream(&self) -> Option<RealtimeEventSender> {
        self.shared.upstream.lock().unwrap().clone()
    }

    /// Poll until `predicate` holds for the call log or `within` elapses.
    pub async fn wait_for_calls<F>(&self, within: Duration, predicate: F) -> bool
    where
        F: Fn(&[ScriptedCall]) -> bool,
    {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            if predicate(&self.calls()) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl RealtimeConnector for ScriptedConnector {
    fn create(&self, config: RealtimeConfig) -> RealtimeResult<BoxedRealtime> {
        self.shared.configs.lock().unwrap().push(config);
        Ok(Box::new(ScriptedRealtime {
            shared: self.shared.clone(),
            connect_error: self.connect_error.clone(),
            events: None,
        }))
    }
}

struct ScriptedRealtime {
    shared: Arc<Shared>,
    connect_error: Option<RealtimeError>,
    events: Option<RealtimeEventSender>,
}

impl ScriptedRealtime {
    fn record(&self, call: ScriptedCall) {
        self.shared.calls.lock().unwrap().push(call);
    }

    async fn emit(&self, event: RealtimeEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event).await;
        }
    }
}

#[async_trait]
impl BaseRealtime for ScriptedRealtime {
    fn new(_config: RealtimeConfig) -> RealtimeResult<Self> {
        Ok(Self {
            shared: Arc::new(Shared::default()),
            connect_error: None,
            events: None,
        })
    }

    async fn connect(&mut self, events: RealtimeEventSender) -> RealtimeResult<()> {
        self.record(ScriptedCall::Connect);
        if let Some(error) = self.connect_error.clone() {
            return Err(error);
        }
        *self.shared.upstream.lock().unwrap() = Some(events.clone());
        self.events = Some(events);
        Ok(())
    }

    async fn disconnect(&mut self) -> RealtimeResult<()> {
        self.record(ScriptedCall::Disconnect);
        self.events = None;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.events.is_some()
    }

    fn get_connection_state(&self) -> ConnectionState {
        if self.is_ready() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    async fn send_audio(&mut self, audio: RealtimeAudioInput) -> RealtimeResult<()> {
        self.record(ScriptedCall::Audio {
            data: audio.data,
            mime_type: audio.mime_type,
        });
        Ok(())
    }

    async fn send_text(&mut self, text: &str) -> RealtimeResult<()> {
        self.record(ScriptedCall::Text(text.to_string()));
        match text {
            "fail" => Err(RealtimeError::WebSocketError("upstream rejected text".to_string())),
            "flood" => {
                for i in 0..FLOOD_EVENTS {
                    self.emit(RealtimeEvent::Text(format!("chunk {i}"))).await;
                }
                Ok(())
            }
            "Hello" => {
                self.emit(RealtimeEvent::Text("Hi there".to_string())).await;
                self.emit(RealtimeEvent::TurnComplete).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn end_turn(&mut self) -> RealtimeResult<()> {
        self.record(ScriptedCall::EndTurn);
        self.emit(RealtimeEvent::TurnComplete).await;
        Ok(())
    }

    fn get_provider_info(&self) -> serde_json::Value {
        serde_json::json!({ "provider": "scripted" })
    }
}
