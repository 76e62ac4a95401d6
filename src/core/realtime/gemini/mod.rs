//! Gemini Live API module.
//!
//! Bidirectional audio and text streaming against Google's Gemini Live
//! (`BidiGenerateContent`) WebSocket API.
//!
//! # Session Flow
//!
//! 1. Open the socket with the API key as a query parameter
//! 2. Send `setup` (model, response modalities, system instruction)
//! 3. Wait for `setupComplete`
//! 4. Stream `realtimeInput` audio and `clientContent` turns; receive
//!    `serverContent` with audio, text, interruption and turn completion
//!
//! # Audio Format
//!
//! Input is PCM 16-bit at 16kHz, output is PCM 16-bit at 24kHz. Payloads are
//! base64 on the wire and are never decoded by this module.

mod client;
mod config;
mod messages;

pub use client::{GeminiLive, GeminiLiveConnector};
pub use config::{
    DEFAULT_SYSTEM_INSTRUCTION, GEMINI_DEFAULT_MODEL, GEMINI_DEFAULT_SETUP_TIMEOUT_MS,
    GEMINI_INPUT_MIME_TYPE, GEMINI_INPUT_SAMPLE_RATE, GEMINI_LIVE_URL, GEMINI_OUTPUT_SAMPLE_RATE,
    Modality, model_resource_name,
};
pub use messages::{
    Blob, ClientContent, ClientMessage, Content, GenerationConfig, GoAway, Part, RealtimeInput,
    ServerContent, ServerMessage, Setup,
};
