//! Realtime voice relay WebSocket handlers
//!
//! Each client socket is bridged to one Gemini Live session.
//!
//! # Protocol
//!
//! All frames are JSON objects with a `type` field. Binary frames carrying
//! UTF-8 JSON are accepted from clients as well.
//!
//! ## Client → Server
//!
//! - **audio**: `{"type":"audio","data":"<base64 PCM 16kHz>"}`
//! - **text**: `{"type":"text","text":"..."}`
//! - **end_turn**: finish the current user turn
//! - **interrupt**: accepted, no effect
//!
//! ## Server → Client
//!
//! - **session_open**: upstream session established
//! - **audio**: `{"type":"audio","data":"<base64 PCM 24kHz>"}`
//! - **text**: model text output
//! - **interrupted**: model output was cut off
//! - **turn_complete**: model finished its turn
//! - **error**: `{"type":"error","error":"..."}`

mod handler;
pub mod messages;

pub use handler::realtime_handler;
pub use messages::{
    CLIENT_AUDIO_MIME_TYPE, MAX_TEXT_SIZE, RealtimeIncomingMessage, RealtimeMessageRoute,
    RealtimeOutgoingMessage, RealtimeValidationError,
};
