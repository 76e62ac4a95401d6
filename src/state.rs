//! Shared application state and the connection keepalive task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::config::ServerConfig;
use crate::core::connection::ConnectionRegistry;
use crate::core::realtime::{GeminiLiveConnector, RealtimeConnector};

/// State shared by every request handler.
pub struct AppState {
    pub config: ServerConfig,
    /// Creates upstream sessions for new connections
    pub connector: Arc<dyn RealtimeConnector>,
    /// Open client connections
    pub connections: ConnectionRegistry,
}

impl AppState {
    /// Build state that opens Gemini Live sessions.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Self::with_connector(config, Arc::new(GeminiLiveConnector))
    }

    /// Build state with a specific session connector.
    pub fn with_connector(config: ServerConfig, connector: Arc<dyn RealtimeConnector>) -> Arc<Self> {
        Arc::new(Self {
            config,
            connector,
            connections: ConnectionRegistry::new(),
        })
    }
}

/// Ping every open connection once per `ping_interval_seconds`.
///
/// Pings are enqueued with `try_send`; a full or closed queue is skipped and
/// no connection is ever evicted from here.
pub fn spawn_keepalive(state: Arc<AppState>) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.ping_interval_seconds.max(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if state.connections.is_empty() {
                continue;
            }
            let sent = state.connections.ping_all();
            debug!(
                pinged = sent,
                open = state.connections.len(),
                "Keepalive sweep"
            );
        }
    })
}
