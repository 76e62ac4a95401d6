//! Realtime WebSocket handler
//!
//! Each accepted socket gets one upstream Gemini Live session. The handler
//! task drives both directions through a single `select!` loop; a separate
//! writer task owns the socket's sending half and drains the connection's
//! outbound queue in order.

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::{select, time::Duration};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::core::connection::ClientConnection;
use crate::core::realtime::{
    BoxedRealtime, RealtimeAudioInput, RealtimeConfig, RealtimeEvent, RealtimeEventSender,
    RealtimeResult,
};
use crate::state::AppState;

use super::messages::{
    CLIENT_AUDIO_MIME_TYPE, RealtimeIncomingMessage, RealtimeMessageRoute, RealtimeOutgoingMessage,
};

/// Optimized channel buffer size for audio workloads
const CHANNEL_BUFFER_SIZE: usize = 1024;

/// Buffer between the upstream session task and this connection
const EVENT_BUFFER_SIZE: usize = 1024;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// How long the writer may keep flushing after the relay loop ends
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Realtime WebSocket handler
///
/// Upgrades the HTTP connection to WebSocket and relays it to a Gemini Live
/// session.
pub async fn realtime_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    debug!("Realtime WebSocket connection upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_realtime_socket(socket, state))
}

/// Handle the realtime WebSocket connection
async fn handle_realtime_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (message_tx, mut message_rx) = mpsc::channel::<RealtimeMessageRoute>(CHANNEL_BUFFER_SIZE);

    let connection = ClientConnection::new(message_tx);
    let connection_id = connection.id();
    app_state.connections.register(connection.clone());
    info!(%connection_id, "Realtime WebSocket connection established");

    // Sender task for outgoing messages
    let mut sender_task = tokio::spawn(async move {
        while let Some(route) = message_rx.recv().await {
            let should_close = matches!(route, RealtimeMessageRoute::Close);

            let result = match route {
                RealtimeMessageRoute::Outgoing(message) => match serde_json::to_string(&message) {
                    Ok(json_str) => sender.send(Message::Text(json_str.into())).await,
                    Err(e) => {
                        error!("Failed to serialize outgoing message: {}", e);
                        continue;
                    }
                },
                RealtimeMessageRoute::Ping => sender.send(Message::Ping(Bytes::new())).await,
                RealtimeMessageRoute::Close => {
                    debug!("Closing realtime WebSocket connection");
                    sender.send(Message::Close(None)).await
                }
            };

            if let Err(e) = result {
                debug!("Failed to send WebSocket message: {}", e);
                break;
            }

            if should_close {
                break;
            }
        }
    });

    let (event_tx, mut event_rx) = mpsc::channel::<RealtimeEvent>(EVENT_BUFFER_SIZE);

    match open_upstream_session(&app_state, event_tx).await {
        Ok(mut provider) => {
            info!(
                %connection_id,
                provider = %provider.get_provider_info(),
                "Upstream session open"
            );
            connection.send(RealtimeOutgoingMessage::SessionOpen).await;

            relay(&mut receiver, &mut event_rx, &mut provider, &connection).await;

            // Teardown must always complete; errors here are not reported
            connection.close();
            if let Err(e) = provider.disconnect().await {
                debug!(%connection_id, error = %e, "Error while closing upstream session ignored");
            }
        }
        Err(e) => {
            warn!(%connection_id, error = %e, "Upstream session establishment failed");
            connection.send(RealtimeOutgoingMessage::error(&e)).await;
            if connection.close() {
                connection.send_close().await;
            }
        }
    }

    finish_connection(&app_state, connection_id, connection, &mut sender_task).await;
}

/// Create the upstream session and wait for it to acknowledge setup.
async fn open_upstream_session(
    app_state: &AppState,
    events: RealtimeEventSender,
) -> RealtimeResult<BoxedRealtime> {
    let mut provider = app_state
        .connector
        .create(build_realtime_config(&app_state.config))?;
    provider.connect(events).await?;
    Ok(provider)
}

/// Build the upstream session configuration from server configuration.
pub(crate) fn build_realtime_config(config: &ServerConfig) -> RealtimeConfig {
    RealtimeConfig {
        api_key: config.google_api_key.clone().unwrap_or_default(),
        model: config.gemini_model.clone(),
        instructions: Some(config.system_instruction.clone()),
        modalities: Some(vec!["AUDIO".to_string()]),
        endpoint: Some(config.gemini_live_url.clone()),
        setup_timeout_ms: Some(config.setup_timeout_ms()),
    }
}

/// Whether the relay loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayFlow {
    Continue,
    Stop,
}

/// Relay until either side closes.
async fn relay<S>(
    receiver: &mut S,
    event_rx: &mut mpsc::Receiver<RealtimeEvent>,
    provider: &mut BoxedRealtime,
    connection: &ClientConnection,
) where
    S: futures::Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let connection_id = connection.id();

    loop {
        select! {
            msg_result = receiver.next() => {
                match msg_result {
                    Some(Ok(msg)) => {
                        if process_realtime_message(msg, provider, event_rx, connection).await
                            == RelayFlow::Stop
                        {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(%connection_id, "Realtime WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        info!(%connection_id, "Realtime WebSocket connection closed by client");
                        break;
                    }
                }
            }

            event = event_rx.recv() => {
                if deliver_event(event, connection).await == RelayFlow::Stop {
                    break;
                }
            }
        }
    }
}

/// Write one upstream event to the client. `Closed` and the end of the
/// event channel close the client transport.
async fn deliver_event(event: Option<RealtimeEvent>, connection: &ClientConnection) -> RelayFlow {
    let connection_id = connection.id();

    match event {
        Some(RealtimeEvent::Closed { reason }) => {
            info!(
                %connection_id,
                reason = reason.as_deref().unwrap_or(""),
                "Upstream session closed"
            );
            if connection.close() {
                connection.send_close().await;
            }
            RelayFlow::Stop
        }
        Some(event) => {
            if let Some(message) = outgoing_for_event(event) {
                connection.send(message).await;
            }
            RelayFlow::Continue
        }
        None => {
            debug!(%connection_id, "Upstream event channel ended");
            if connection.close() {
                connection.send_close().await;
            }
            RelayFlow::Stop
        }
    }
}

/// Drive an upstream forward to completion while still delivering upstream
/// events to the client.
///
/// Returns `None` when the upstream session ended first; the pending forward
/// is dropped.
async fn forward_draining_events<F>(
    forward: F,
    event_rx: &mut mpsc::Receiver<RealtimeEvent>,
    connection: &ClientConnection,
) -> Option<RealtimeResult<()>>
where
    F: std::future::Future<Output = RealtimeResult<()>>,
{
    tokio::pin!(forward);

    loop {
        select! {
            biased;

            result = &mut forward => return Some(result),

            event = event_rx.recv() => {
                if deliver_event(event, connection).await == RelayFlow::Stop {
                    return None;
                }
            }
        }
    }
}

/// Process incoming WebSocket message
async fn process_realtime_message(
    msg: Message,
    provider: &mut BoxedRealtime,
    event_rx: &mut mpsc::Receiver<RealtimeEvent>,
    connection: &ClientConnection,
) -> RelayFlow {
    match msg {
        Message::Text(text) => {
            debug!("Received text message: {} bytes", text.len());
            handle_client_payload(text.as_str().as_bytes(), provider, event_rx, connection).await
        }
        Message::Binary(data) => {
            debug!("Received binary message: {} bytes", data.len());
            handle_client_payload(&data, provider, event_rx, connection).await
        }
        Message::Ping(_) | Message::Pong(_) => RelayFlow::Continue,
        Message::Close(_) => {
            info!(connection_id = %connection.id(), "Realtime WebSocket close received");
            RelayFlow::Stop
        }
    }
}

/// Parse, validate and forward one client frame. Every failure is reported
/// back to the client and the connection stays open.
async fn handle_client_payload(
    payload: &[u8],
    provider: &mut BoxedRealtime,
    event_rx: &mut mpsc::Receiver<RealtimeEvent>,
    connection: &ClientConnection,
) -> RelayFlow {
    let incoming = match RealtimeIncomingMessage::parse(payload) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to parse realtime message: {}", e);
            connection.send(RealtimeOutgoingMessage::error(e)).await;
            return RelayFlow::Continue;
        }
    };

    if let Err(e) = incoming.validate_size() {
        warn!("Message validation failed: {}", e);
        connection.send(RealtimeOutgoingMessage::error(e)).await;
        return RelayFlow::Continue;
    }

    let forward = async {
        match incoming {
            RealtimeIncomingMessage::Audio { data } => {
                provider
                    .send_audio(RealtimeAudioInput {
                        data,
                        mime_type: CLIENT_AUDIO_MIME_TYPE.to_string(),
                    })
                    .await
            }
            RealtimeIncomingMessage::Text { text } => provider.send_text(&text).await,
            RealtimeIncomingMessage::EndTurn => provider.end_turn().await,
            RealtimeIncomingMessage::Interrupt => {
                debug!("Interrupt received; nothing to forward");
                Ok(())
            }
        }
    };

    match forward_draining_events(forward, event_rx, connection).await {
        Some(Ok(())) => RelayFlow::Continue,
        Some(Err(e)) => {
            warn!(
                upstream_state = %provider.get_connection_state(),
                "Failed to forward client message: {}", e
            );
            connection.send(RealtimeOutgoingMessage::error(e)).await;
            RelayFlow::Continue
        }
        None => RelayFlow::Stop,
    }
}

/// Map an upstream event to the message the client sees.
///
/// `Closed` has no message; it ends the relay instead.
fn outgoing_for_event(event: RealtimeEvent) -> Option<RealtimeOutgoingMessage> {
    match event {
        RealtimeEvent::Audio(audio) => Some(RealtimeOutgoingMessage::Audio { data: audio.data }),
        RealtimeEvent::Text(text) => Some(RealtimeOutgoingMessage::Text { text }),
        RealtimeEvent::Interrupted => Some(RealtimeOutgoingMessage::Interrupted),
        RealtimeEvent::TurnComplete => Some(RealtimeOutgoingMessage::TurnComplete),
        RealtimeEvent::Error(error) => Some(RealtimeOutgoingMessage::Error { error }),
        RealtimeEvent::Closed { .. } => None,
    }
}

/// Deregister the connection and let the writer flush what is queued.
async fn finish_connection(
    app_state: &AppState,
    connection_id: Uuid,
    connection: Arc<ClientConnection>,
    sender_task: &mut tokio::task::JoinHandle<()>,
) {
    app_state.connections.remove(&connection_id);
    // Dropping the last handle closes the outbound queue and ends the writer
    drop(connection);

    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut *sender_task)
        .await
        .is_err()
    {
        debug!(%connection_id, "Writer did not finish in time, aborting");
        sender_task.abort();
    }

    info!(%connection_id, "Realtime WebSocket connection terminated");
}
