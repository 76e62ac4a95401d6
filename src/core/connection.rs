//! Client connection state and the shared connection registry.
//!
//! A [`ClientConnection`] is the relay-side handle for one accepted client
//! WebSocket. It owns the sending half of the channel that feeds the
//! connection's writer task and an explicit Open/Closed lifecycle. The
//! [`ConnectionRegistry`] tracks open connections so the keepalive sweep can
//! reach them.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::handlers::realtime::{RealtimeMessageRoute, RealtimeOutgoingMessage};

const OPEN: u8 = 0;
const CLOSED: u8 = 1;

/// Lifecycle of a client connection. The only transition is Open -> Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionLifecycle {
    /// Accepting and relaying messages
    Open,
    /// Closed by either side; sends are no-ops
    Closed,
}

impl fmt::Display for ConnectionLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionLifecycle::Open => write!(f, "open"),
            ConnectionLifecycle::Closed => write!(f, "closed"),
        }
    }
}

/// One accepted client WebSocket.
pub struct ClientConnection {
    id: Uuid,
    state: AtomicU8,
    outbound: mpsc::Sender<RealtimeMessageRoute>,
}

impl ClientConnection {
    /// Create an open connection with a fresh id.
    pub fn new(outbound: mpsc::Sender<RealtimeMessageRoute>) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            state: AtomicU8::new(OPEN),
            outbound,
        })
    }

    /// Connection id
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> ConnectionLifecycle {
        match self.state.load(Ordering::Acquire) {
            OPEN => ConnectionLifecycle::Open,
            _ => ConnectionLifecycle::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.lifecycle() == ConnectionLifecycle::Open
    }

    /// Transition Open -> Closed.
    ///
    /// Returns `true` only for the caller that performed the transition, so
    /// exactly one side runs the close path.
    pub fn close(&self) -> bool {
        self.state
            .compare_exchange(OPEN, CLOSED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Queue a message for the client.
    ///
    /// Returns `false` without sending when the connection is closed or the
    /// writer task has gone away.
    pub async fn send(&self, message: RealtimeOutgoingMessage) -> bool {
        if !self.is_open() {
            return false;
        }
        self.outbound
            .send(RealtimeMessageRoute::Outgoing(message))
            .await
            .is_ok()
    }

    /// Ask the writer task to close the client transport.
    pub async fn send_close(&self) {
        let _ = self.outbound.send(RealtimeMessageRoute::Close).await;
    }

    /// Enqueue a protocol ping without waiting. Returns `false` if the
    /// connection is closed or its queue is full.
    pub fn ping(&self) -> bool {
        self.is_open() && self.outbound.try_send(RealtimeMessageRoute::Ping).is_ok()
    }
}

impl fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

/// Registry of open client connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<Uuid, Arc<ClientConnection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a connection.
    pub fn register(&self, connection: Arc<ClientConnection>) {
        self.connections.insert(connection.id(), connection);
    }

    /// Stop tracking a connection.
    pub fn remove(&self, id: &Uuid) -> Option<Arc<ClientConnection>> {
        self.connections.remove(id).map(|(_, connection)| connection)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Enqueue a ping on every registered connection, returning how many
    /// were accepted. Failures are ignored and nothing is evicted.
    pub fn ping_all(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.value().ping())
            .count()
    }
}
