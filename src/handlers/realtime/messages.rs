//! Realtime WebSocket message types
//!
//! This module defines the JSON protocol spoken between browser clients and
//! the relay. Every frame is an object with a `type` discriminator; audio is
//! carried as base64 strings and never decoded by the relay.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum allowed size for text messages (50 KB)
pub const MAX_TEXT_SIZE: usize = 50 * 1024;

/// Format of client audio frames (16kHz 16-bit mono PCM)
pub const CLIENT_AUDIO_MIME_TYPE: &str = "audio/pcm;rate=16000";

// =============================================================================
// Incoming Messages (Client -> Server)
// =============================================================================

/// Incoming WebSocket messages from client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeIncomingMessage {
    /// Microphone audio chunk
    Audio {
        /// Base64 PCM, 16kHz 16-bit mono
        data: String,
    },

    /// Complete user text turn
    Text {
        /// Text content
        text: String,
    },

    /// End of the current user turn
    EndTurn,

    /// Barge-in signal. Accepted and ignored: the upstream voice-activity
    /// detection already cuts playback when the user starts talking.
    Interrupt,
}

impl RealtimeIncomingMessage {
    /// Parse a client frame. Text and binary frames both carry UTF-8 JSON.
    pub fn parse(payload: &[u8]) -> Result<Self, RealtimeValidationError> {
        serde_json::from_slice(payload)
            .map_err(|e| RealtimeValidationError::InvalidMessage(e.to_string()))
    }

    /// Validates message field sizes to prevent resource exhaustion attacks.
    pub fn validate_size(&self) -> Result<(), RealtimeValidationError> {
        match self {
            RealtimeIncomingMessage::Text { text } => {
                let size = text.len();
                if size > MAX_TEXT_SIZE {
                    return Err(RealtimeValidationError::TextTooLarge {
                        size,
                        max: MAX_TEXT_SIZE,
                    });
                }
            }
            // Audio is bounded by the frame size limit
            RealtimeIncomingMessage::Audio { .. }
            | RealtimeIncomingMessage::EndTurn
            | RealtimeIncomingMessage::Interrupt => {}
        }
        Ok(())
    }
}

// =============================================================================
// Outgoing Messages (Server -> Client)
// =============================================================================

/// Outgoing WebSocket messages to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeOutgoingMessage {
    /// Upstream session established
    SessionOpen,

    /// Model audio chunk
    Audio {
        /// Base64 PCM, 24kHz 16-bit mono
        data: String,
    },

    /// Model text output
    Text {
        /// Text content
        text: String,
    },

    /// Model output was cut off
    Interrupted,

    /// Model finished its turn
    TurnComplete,

    /// Error message
    Error {
        /// Human-readable description
        error: String,
    },
}

impl RealtimeOutgoingMessage {
    /// Build an error message from anything displayable.
    pub fn error(error: impl std::fmt::Display) -> Self {
        RealtimeOutgoingMessage::Error {
            error: error.to_string(),
        }
    }
}

// =============================================================================
// Message Routing
// =============================================================================

/// Work items for the per-connection writer task
#[derive(Debug)]
pub enum RealtimeMessageRoute {
    /// JSON text message
    Outgoing(RealtimeOutgoingMessage),
    /// Protocol-level ping
    Ping,
    /// Close connection
    Close,
}

// =============================================================================
// Validation
// =============================================================================

/// Error type for message validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RealtimeValidationError {
    /// Frame is not valid JSON or not a known message
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
    /// Text content exceeds maximum allowed size
    #[error("Text too large: {size} bytes (max: {max} bytes)")]
    TextTooLarge { size: usize, max: usize },
}
