//! Realtime conversational provider module.
//!
//! This module provides the abstraction the relay drives (`BaseRealtime`) and
//! the Gemini Live implementation behind it.
//!
//! # Architecture
//!
//! - `BaseRealtime` trait for provider abstraction
//! - `RealtimeConnector` for creating sessions without naming a provider
//! - Event channel (`RealtimeEvent`) instead of per-kind callbacks, so the
//!   relay sees upstream output in one ordered stream
//!
//! # Example
//!
//! ```rust,ignore
//! use live_relay::core::realtime::{GeminiLiveConnector, RealtimeConfig, RealtimeConnector};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RealtimeConfig {
//!         api_key: "AIza...".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let (tx, mut rx) = mpsc::channel(64);
//!     let mut session = GeminiLiveConnector.create(config).unwrap();
//!     session.connect(tx).await.unwrap();
//!     session.send_text("Hello").await.unwrap();
//!
//!     while let Some(event) = rx.recv().await {
//!         println!("{event:?}");
//!     }
//! }
//! ```

mod base;
pub mod gemini;

pub use base::{
    BaseRealtime, BoxedRealtime, ConnectionState, RealtimeAudioData, RealtimeAudioInput,
    RealtimeConfig, RealtimeConnector, RealtimeError, RealtimeEvent, RealtimeEventSender,
    RealtimeResult,
};
pub use gemini::{GeminiLive, GeminiLiveConnector};
