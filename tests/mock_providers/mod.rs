//! Mock upstream providers
//!
//! Two ways to stand in for Gemini Live:
//! - `gemini_live_mock`: a real WebSocket server speaking the Live wire format,
//!   for exercising `GeminiLive` end to end
//! - `scripted_realtime`: an in-process `RealtimeConnector` whose sessions
//!   record every call and let the test push upstream events directly

// Not every test binary uses every helper
#![allow(dead_code)]

pub mod gemini_live_mock;
pub mod scripted_realtime;

pub use gemini_live_mock::{MockGeminiServer, SetupReply};
pub use scripted_realtime::{FLOOD_EVENTS, ScriptedCall, ScriptedConnector};
