//! Turns an inbound request into a registered, kept-alive event stream and
//! reconciles the registry when the peer goes away.
//!
//! A connection moves `Handshaking -> Open -> Closed`. There is no reconnect
//! state: a client that reconnects arrives as a brand new connection and is
//! merged into its existing record when the id matches.

use crate::connection::Connection;
use crate::encoder::{initial_frame, keep_alive_frame};
use crate::message::Group;
use crate::registry::{Client, ClientId, ClientRegistry, Metadata};
use crate::transport::Transport;
use axum::http::header::{HeaderName, HeaderValue, CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use futures::future::BoxFuture;
use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Interval between keep-alive comments when none is configured.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(20);

static X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

pub type DisconnectCallback = Box<dyn FnOnce() + Send + 'static>;

/// Per-connection options for [`Lifecycle::connect`].
#[derive(Default)]
pub struct ConnectOptions {
    /// Extra response headers. The fixed SSE headers take precedence.
    pub headers: HeaderMap,
    /// Metadata for a newly created client.
    pub metadata: Option<Metadata>,
    /// Client identity; generated when absent.
    pub client_id: Option<ClientId>,
    pub group: Group,
    /// Invoked exactly once after the connection has been unregistered.
    pub on_disconnect: Option<DisconnectCallback>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn client_id(mut self, client_id: impl Into<ClientId>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn group(mut self, group: impl Into<Group>) -> Self {
        self.group = group.into();
        self
    }

    pub fn on_disconnect(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_disconnect = Some(Box::new(callback));
        self
    }
}

/// Result of a successful handshake.
#[derive(Debug, Clone)]
pub struct Connected {
    /// Snapshot of the client right after registration.
    pub client: Client,
    pub connection: Connection,
}

pub struct Lifecycle {
    registry: Arc<ClientRegistry>,
    keep_alive: Duration,
}

impl Lifecycle {
    pub fn new(registry: Arc<ClientRegistry>, keep_alive: Duration) -> Self {
        Self {
            registry,
            keep_alive,
        }
    }

    /// Performs the handshake on `transport` and spawns the task that keeps the
    /// stream alive and cleans up after disconnect.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        options: ConnectOptions,
    ) -> Connected {
        let ConnectOptions {
            headers,
            metadata,
            client_id,
            group,
            on_disconnect,
        } = options;

        transport.write_head(StatusCode::OK, stream_headers(headers));

        let connection = Connection::new(transport.sink());
        let (client_id, client) =
            self.registry
                .register(group.clone(), client_id, metadata, connection.clone());

        if let Err(e) = connection.write(initial_frame()) {
            warn!("Failed to flush SSE headers for client {client_id}: {e}");
        }
        connection.mark_open();

        let disconnect = Disconnect {
            registry: self.registry.clone(),
            group,
            client_id,
            connection: connection.clone(),
            on_disconnect,
        };
        tokio::spawn(supervise(disconnect, transport.closed(), self.keep_alive));

        Connected { client, connection }
    }
}

/// Merges the fixed event stream headers over the caller's headers.
pub fn stream_headers(mut headers: HeaderMap) -> HeaderMap {
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(X_ACCEL_BUFFERING.clone(), HeaderValue::from_static("no"));
    headers
}

/// Everything needed to tear a connection down once.
struct Disconnect {
    registry: Arc<ClientRegistry>,
    group: Group,
    client_id: ClientId,
    connection: Connection,
    on_disconnect: Option<DisconnectCallback>,
}

impl Disconnect {
    /// Unregisters the connection and runs the callback. Only the first call
    /// has any effect.
    fn release(&mut self) {
        if !self.connection.mark_closed() {
            return;
        }

        self.registry
            .unregister_connection(&self.group, &self.client_id, self.connection.id());
        debug!(
            "SSE connection {} for client {} closed",
            self.connection.id(),
            self.client_id
        );

        if let Some(callback) = self.on_disconnect.take() {
            callback();
        }
    }
}

async fn supervise(mut disconnect: Disconnect, mut closed: BoxFuture<'static, ()>, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Close wins over a due tick so nothing is written after it.
            biased;
            _ = &mut closed => break,
            _ = ticker.tick() => {
                if let Err(e) = disconnect.connection.write(keep_alive_frame()) {
                    debug!("SSE keep-alive to {} failed: {e}", disconnect.connection.id());
                }
            }
        }
    }

    disconnect.release();
}
