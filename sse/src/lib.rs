//! Server-Sent Events (SSE) connection registry and dispatch engine.
//!
//! Clients open a long-lived `text/event-stream` response; the application later
//! pushes events to a single connection, to every connection of one client, or to
//! every client of a group.
//!
//! # Architecture
//!
//! - **Groups**: the registry is partitioned into groups. Clients in different
//!   groups never see each other's events. The default group always exists;
//!   other groups are created on first registration.
//! - **Multiple connections per client**: a client id maps to every live
//!   connection opened with that id (e.g. several browser tabs). A client with
//!   no connections left is removed.
//! - **Encode once**: the wire block is built once per dispatch call and the
//!   same bytes are written to every recipient.
//! - **Failure isolation**: a failed write is logged and reported in the
//!   returned [`Delivery`], never aborting a broadcast.
//! - **Ephemeral messages**: offline clients simply miss events.
//!
//! # Message Flow
//!
//! 1. The HTTP layer wraps its response in a [`Transport`](transport::Transport) and calls
//!    [`Manager::connect`].
//! 2. The connection is registered, the SSE headers and a first byte are
//!    written, and a background task starts sending keep-alive comments.
//! 3. Application code calls `send_to_connection`, `send_to_client` or
//!    `send_to_group`.
//! 4. When the peer disconnects, the background task removes the connection
//!    from the registry and runs the caller's disconnect callback.
//!
//! # Example
//!
//! ```rust,ignore
//! use sse::{ConnectOptions, Event, Manager};
//!
//! let manager = Manager::new();
//! let (mut transport, body) = sse::transport::ChannelTransport::new();
//! let connected = manager.connect(&mut transport, ConnectOptions::new().group("room"));
//!
//! manager.send_to_group("room", &Event::new(json!({"a": 1})).event_type("update"))?;
//! ```
//!
//! # Modules
//!
//! - `connection`: connection handles, ids, states and the `Sink` seam
//! - `dispatcher`: one-connection, one-client and whole-group delivery
//! - `encoder`: the event stream wire format
//! - `lifecycle`: handshake, keep-alive and disconnect handling
//! - `manager`: the facade used by application code
//! - `message`: events, payloads and groups
//! - `registry`: group -> client -> connections bookkeeping
//! - `transport`: the seam to the HTTP server plus a channel-backed transport

pub mod connection;
pub mod dispatcher;
pub mod encoder;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod manager;
pub mod message;
pub mod registry;
pub mod transport;

pub use connection::{Connection, ConnectionId, ConnectionState};
pub use dispatcher::{Delivery, FailedWrite};
pub use error::{Error, Result};
pub use lifecycle::{ConnectOptions, Connected};
pub use manager::Manager;
pub use message::{Event, Group, Payload};
pub use registry::{Client, ClientId, Metadata};
