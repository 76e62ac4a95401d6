//! Base traits and types for realtime conversational providers.
//!
//! A provider session is created from a [`RealtimeConfig`] by a
//! [`RealtimeConnector`], connected with an event sink, and then driven by the
//! relay through the [`BaseRealtime`] trait. Everything the provider receives
//! from the remote service is delivered through the sink as a
//! [`RealtimeEvent`], in the order the remote service produced it.
//!
//! # Audio Format
//!
//! Audio is passed through as base64 payloads. Input is declared as 16kHz
//! 16-bit mono PCM; output is whatever the provider produces (24kHz 16-bit PCM
//! for Gemini Live).

use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during realtime operations.
#[derive(Debug, Clone, Error)]
pub enum RealtimeError {
    /// Connection to the provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The provider refused the session setup. Displays the provider's own
    /// reason unchanged so it can be shown to the client as-is.
    #[error("{0}")]
    SetupRejected(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Operation timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Not connected
    #[error("Not connected")]
    NotConnected,
}

/// Result type for realtime operations.
pub type RealtimeResult<T> = Result<T, RealtimeError>;

// =============================================================================
// Configuration Types
// =============================================================================

/// Base configuration for realtime providers.
#[derive(Debug, Clone, Default)]
pub struct RealtimeConfig {
    /// API key for authentication
    pub api_key: String,

    /// Model to use (e.g., "gemini-live-2.5-flash-preview")
    pub model: String,

    /// System instruction sent once at session setup
    pub instructions: Option<String>,

    /// Response modalities requested from the model (e.g., ["AUDIO"])
    pub modalities: Option<Vec<String>>,

    /// WebSocket endpoint override, mainly for tests and proxies
    pub endpoint: Option<String>,

    /// Upper bound on the setup handshake, in milliseconds
    pub setup_timeout_ms: Option<u64>,
}

// =============================================================================
// Connection State
// =============================================================================

/// Connection state for realtime providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected to the provider
    #[default]
    Disconnected,
    /// Handshake and setup in progress
    Connecting,
    /// Setup acknowledged, session usable
    Connected,
    /// Connection failed or was closed by the provider
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Failed => write!(f, "Failed"),
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// Audio frame received from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeAudioData {
    /// Base64-encoded audio payload, passed through untouched
    pub data: String,
    /// Declared MIME type (e.g., "audio/pcm;rate=24000")
    pub mime_type: Option<String>,
}

/// Audio frame to send to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeAudioInput {
    /// Base64-encoded audio payload
    pub data: String,
    /// Declared MIME type (e.g., "audio/pcm;rate=16000")
    pub mime_type: String,
}

/// A single upstream occurrence, already classified by the provider adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    /// Model audio output
    Audio(RealtimeAudioData),
    /// Model text output
    Text(String),
    /// Model output was cut off by the provider's voice-activity detection
    Interrupted,
    /// The model finished its turn
    TurnComplete,
    /// Mid-session provider error; does not end the session by itself
    Error(String),
    /// The provider closed the session
    Closed {
        /// Close reason reported by the provider, if any
        reason: Option<String>,
    },
}

/// Sink through which a connected provider delivers its events.
pub type RealtimeEventSender = mpsc::Sender<RealtimeEvent>;

// =============================================================================
// Base Trait
// =============================================================================

/// Base trait for realtime conversational providers.
///
/// # Example
///
/// ```rust,ignore
/// use live_relay::core::realtime::{BaseRealtime, GeminiLive, RealtimeConfig};
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() {
///     let config = RealtimeConfig {
///         api_key: "AIza...".to_string(),
///         model: "gemini-live-2.5-flash-preview".to_string(),
///         ..Default::default()
///     };
///
///     let (tx, mut rx) = mpsc::channel(64);
///     let mut session = GeminiLive::new(config)?;
///     session.connect(tx).await?;
///     session.send_text("Hello").await?;
///
///     while let Some(event) = rx.recv().await {
///         println!("{event:?}");
///     }
/// }
/// ```
#[async_trait]
pub trait BaseRealtime: Send + Sync {
    /// Create a new realtime provider instance.
    fn new(config: RealtimeConfig) -> RealtimeResult<Self>
    where
        Self: Sized;

    /// Connect to the provider and complete the session setup.
    ///
    /// Resolves only once the provider acknowledged the setup. Events are
    /// delivered to `events` from then on, in provider order.
    async fn connect(&mut self, events: RealtimeEventSender) -> RealtimeResult<()>;

    /// Disconnect from the provider. Calling this on a session that is
    /// already closed is not an error.
    async fn disconnect(&mut self) -> RealtimeResult<()>;

    /// Check if the provider is connected and ready.
    fn is_ready(&self) -> bool;

    /// Get the current connection state.
    fn get_connection_state(&self) -> ConnectionState;

    /// Forward a realtime audio frame.
    async fn send_audio(&mut self, audio: RealtimeAudioInput) -> RealtimeResult<()>;

    /// Send a complete user text turn.
    async fn send_text(&mut self, text: &str) -> RealtimeResult<()>;

    /// Mark the end of the current user turn without adding content.
    async fn end_turn(&mut self) -> RealtimeResult<()>;

    /// Get provider information.
    fn get_provider_info(&self) -> serde_json::Value;
}

/// Boxed trait object for realtime providers.
pub type BoxedRealtime = Box<dyn BaseRealtime>;

/// Creates unconnected provider sessions. Held by the application state so the
/// relay does not depend on a concrete provider.
pub trait RealtimeConnector: Send + Sync {
    /// Create a new provider session from configuration.
    fn create(&self, config: RealtimeConfig) -> RealtimeResult<BoxedRealtime>;
}
