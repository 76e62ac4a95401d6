//! Realtime WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::realtime::realtime_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the Realtime WebSocket router
///
/// # Endpoint
///
/// `GET /realtime` - WebSocket upgrade relayed to a Gemini Live session
///
/// # Example
///
/// ```json
/// // Server, once the upstream session is ready
/// {"type": "session_open"}
///
/// // Client sends a text turn
/// {"type": "text", "text": "Which 150cc bike has the best mileage?"}
///
/// // Server streams the reply
/// {"type": "audio", "data": "<base64 PCM 24kHz>"}
/// {"type": "turn_complete"}
/// ```
pub fn create_realtime_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/realtime", get(realtime_handler))
        .layer(TraceLayer::new_for_http())
}
