pub mod connection;
pub mod realtime;

pub use connection::{ClientConnection, ConnectionLifecycle, ConnectionRegistry};

pub use realtime::{
    BaseRealtime, BoxedRealtime, GeminiLive, GeminiLiveConnector, RealtimeConfig,
    RealtimeConnector, RealtimeError, RealtimeEvent, RealtimeResult,
};
