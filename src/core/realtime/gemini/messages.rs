//! Gemini Live API WebSocket message types.
//!
//! # Protocol Overview
//!
//! Client messages (sent to server), exactly one key per message:
//! - `setup` - Model, generation config and system instruction; sent first
//! - `clientContent` - Structured conversation turns
//! - `realtimeInput` - Streaming audio input
//!
//! Server messages (received from server), one key per message:
//! - `setupComplete` - Setup acknowledged
//! - `serverContent` - Model output, interruption and turn completion
//! - `goAway` - Server will disconnect soon
//! - `toolCall`, `usageMetadata` - Not used by the relay

use serde::{Deserialize, Serialize};

use super::config::{GEMINI_INPUT_MIME_TYPE, Modality};
use crate::core::realtime::base::{RealtimeAudioData, RealtimeEvent};

// =============================================================================
// Shared Content Types
// =============================================================================

/// A conversation turn or instruction made of parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Author of the content ("user" or "model")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Ordered content parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part. Exactly one payload field is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline binary payload (base64)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    /// Marks model reasoning that must not be shown to the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// MIME type (e.g., "audio/pcm;rate=16000")
    pub mime_type: String,
    /// Base64-encoded data
    pub data: String,
}

// =============================================================================
// Client Messages
// =============================================================================

/// Messages sent to the Live API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientMessage {
    /// Session setup; must be the first message on the socket
    Setup(Setup),
    /// Structured conversation turns
    ClientContent(ClientContent),
    /// Streaming realtime input
    RealtimeInput(RealtimeInput),
}

/// Session setup payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    /// Fully qualified model name (`models/...`)
    pub model: String,
    /// Generation options
    pub generation_config: GenerationConfig,
    /// System instruction for the whole session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

/// Generation options sent at setup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requested output modalities
    pub response_modalities: Vec<Modality>,
}

/// Conversation turns appended by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContent {
    /// Turns to append; may be empty
    pub turns: Vec<Content>,
    /// Whether the model should start generating after these turns
    pub turn_complete: bool,
}

/// Realtime input frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    /// Audio chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Blob>,
}

impl ClientMessage {
    /// Build the setup message.
    pub fn setup(model: String, modalities: Vec<Modality>, instruction: Option<&str>) -> Self {
        ClientMessage::Setup(Setup {
            model,
            generation_config: GenerationConfig {
                response_modalities: modalities,
            },
            system_instruction: instruction.map(|text| Content {
                role: None,
                parts: vec![Part::text(text)],
            }),
        })
    }

    /// Build a realtime audio frame.
    pub fn audio(data: String, mime_type: Option<String>) -> Self {
        ClientMessage::RealtimeInput(RealtimeInput {
            audio: Some(Blob {
                mime_type: mime_type.unwrap_or_else(|| GEMINI_INPUT_MIME_TYPE.to_string()),
                data,
            }),
        })
    }

    /// Build a complete user text turn.
    pub fn user_text(text: &str) -> Self {
        ClientMessage::ClientContent(ClientContent {
            turns: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(text)],
            }],
            turn_complete: true,
        })
    }

    /// Build a bare turn-completion signal.
    pub fn end_turn() -> Self {
        ClientMessage::ClientContent(ClientContent {
            turns: Vec::new(),
            turn_complete: true,
        })
    }
}

// =============================================================================
// Server Messages
// =============================================================================

/// Messages received from the Live API.
///
/// The wire format is an object with one populated key, so every key is
/// optional here and unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    /// Setup acknowledgement (an empty object)
    #[serde(default)]
    pub setup_complete: Option<serde_json::Value>,
    /// Model output and turn signals
    #[serde(default)]
    pub server_content: Option<ServerContent>,
    /// Advance notice of a server-side disconnect
    #[serde(default)]
    pub go_away: Option<GoAway>,
    /// Function calls requested by the model
    #[serde(default)]
    pub tool_call: Option<serde_json::Value>,
    /// Token accounting
    #[serde(default)]
    pub usage_metadata: Option<serde_json::Value>,
}

/// Incremental server content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    /// Model output for the current turn
    #[serde(default)]
    pub model_turn: Option<Content>,
    /// The model finished its turn
    #[serde(default)]
    pub turn_complete: bool,
    /// Generation was cut off by user activity
    #[serde(default)]
    pub interrupted: bool,
    /// The model finished generating (may precede turn completion)
    #[serde(default)]
    pub generation_complete: bool,
}

/// Disconnect notice.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoAway {
    /// Remaining time before the server closes, as a protobuf duration
    #[serde(default)]
    pub time_left: Option<String>,
}

impl ServerMessage {
    /// Whether this message acknowledges the session setup.
    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete.is_some()
    }

    /// Classify this message into relay events.
    ///
    /// Output parts come first in part order (audio and text interleaved as
    /// sent), then `Interrupted`, then `TurnComplete`. Thought parts are
    /// dropped.
    pub fn into_events(self) -> Vec<RealtimeEvent> {
        let Some(content) = self.server_content else {
            return Vec::new();
        };

        let mut events = Vec::new();

        if let Some(turn) = content.model_turn {
            for part in turn.parts {
                if part.thought == Some(true) {
                    continue;
                }
                if let Some(blob) = part.inline_data {
                    events.push(RealtimeEvent::Audio(RealtimeAudioData {
                        data: blob.data,
                        mime_type: Some(blob.mime_type),
                    }));
                } else if let Some(text) = part.text {
                    events.push(RealtimeEvent::Text(text));
                }
            }
        }

        if content.interrupted {
            events.push(RealtimeEvent::Interrupted);
        }
        if content.turn_complete {
            events.push(RealtimeEvent::TurnComplete);
        }

        events
    }
}
