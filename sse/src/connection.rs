use crate::error::Result;
use bytes::Bytes;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Writable end of one outbound byte stream.
///
/// Implementations must accept whole frames atomically so that concurrent
/// writers to the same connection never interleave partial records.
pub trait Sink: Send + Sync {
    fn write(&self, frame: Bytes) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Handshaking = 0,
    Open = 1,
    Closed = 2,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Handshaking,
            1 => ConnectionState::Open,
            _ => ConnectionState::Closed,
        }
    }
}

/// Handle to one live connection belonging to a client.
///
/// Cloning is cheap and clones share identity, sink and state. Two handles are
/// equal when they refer to the same connection.
#[derive(Clone)]
pub struct Connection {
    id: ConnectionId,
    sink: Arc<dyn Sink>,
    state: Arc<AtomicU8>,
}

impl Connection {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            id: ConnectionId::new(),
            sink,
            state: Arc::new(AtomicU8::new(ConnectionState::Handshaking as u8)),
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn write(&self, frame: Bytes) -> Result<()> {
        self.sink.write(frame)
    }

    pub(crate) fn mark_open(&self) -> bool {
        self.state
            .compare_exchange(
                ConnectionState::Handshaking as u8,
                ConnectionState::Open as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Moves the connection to `Closed`. Returns `false` if it was already closed.
    pub(crate) fn mark_closed(&self) -> bool {
        self.state.swap(ConnectionState::Closed as u8, Ordering::AcqRel)
            != ConnectionState::Closed as u8
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}
