//! Router assembly

pub mod api;
pub mod realtime;

use std::sync::Arc;

use axum::Router;
use http::{HeaderValue, Method, header::CONTENT_TYPE};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the complete application: health, realtime WebSocket, static files
/// and CORS.
pub fn create_app(app_state: Arc<AppState>) -> Router {
    let cors_layer = cors_layer(&app_state.config);

    let mut app = api::create_api_router().merge(realtime::create_realtime_router());

    if let Some(static_dir) = app_state.config.static_dir.clone() {
        info!("Serving static files from {}", static_dir.display());
        app = app.fallback_service(ServeDir::new(static_dir));
    }

    app.with_state(app_state).layer(cors_layer)
}

/// CORS layer for the configured origins. `*` allows any origin.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(false);

    match config.allowed_origins() {
        None => base.allow_origin(Any),
        Some(origins) => {
            // Parse comma-separated origins
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            base.allow_origin(origins)
        }
    }
}
