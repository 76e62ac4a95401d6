//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `realtime` - Client WebSocket relayed to Gemini Live

pub mod api;
pub mod realtime;

pub use realtime::realtime_handler;
