use crate::connection::Connection;
use crate::dispatcher::{Delivery, Dispatcher};
use crate::encoder::{Encode, WireEncoder};
use crate::error::Result;
use crate::id::{IdGenerator, UuidGenerator};
use crate::lifecycle::{ConnectOptions, Connected, Lifecycle, DEFAULT_KEEP_ALIVE};
use crate::message::{Event, Group};
use crate::registry::{Client, ClientRegistry, Metadata};
use crate::transport::Transport;
use log::*;
use std::sync::Arc;
use std::time::Duration;

/// Application-facing entry point: owns the registry and wires the dispatcher
/// and connection lifecycle around it.
///
/// Each `Manager` is an isolated registry; share one through an `Arc`.
pub struct Manager {
    registry: Arc<ClientRegistry>,
    dispatcher: Dispatcher,
    lifecycle: Lifecycle,
}

impl Manager {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::default()
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Opens an event stream on `transport`. See [`Lifecycle::connect`].
    pub fn connect<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        options: ConnectOptions,
    ) -> Connected {
        let connected = self.lifecycle.connect(transport, options);
        info!(
            "Registered SSE connection {} for client {}",
            connected.connection.id(),
            connected.client.id
        );
        connected
    }

    pub fn send_to_connection(&self, connection: &Connection, event: &Event) -> Result<Delivery> {
        self.dispatcher.send_to_connection(connection, event)
    }

    pub fn send_to_client(
        &self,
        group: impl Into<Group>,
        client_id: &str,
        event: &Event,
    ) -> Result<Delivery> {
        self.dispatcher.send_to_client(&group.into(), client_id, event)
    }

    pub fn send_to_group(&self, group: impl Into<Group>, event: &Event) -> Result<Delivery> {
        self.dispatcher.send_to_group(&group.into(), event)
    }

    pub fn get_client(&self, group: impl Into<Group>, client_id: &str) -> Option<Client> {
        self.registry.lookup(&group.into(), client_id)
    }

    pub fn list_clients(&self, group: impl Into<Group>) -> Vec<Client> {
        self.registry.list(&group.into())
    }

    pub fn set_client_metadata(
        &self,
        group: impl Into<Group>,
        client_id: &str,
        metadata: Metadata,
    ) -> Option<Client> {
        self.registry.set_metadata(&group.into(), client_id, metadata)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a [`Manager`] with injected collaborators.
pub struct ManagerBuilder {
    keep_alive: Duration,
    id_generator: Arc<dyn IdGenerator>,
    encoder: Arc<dyn Encode>,
}

impl Default for ManagerBuilder {
    fn default() -> Self {
        Self {
            keep_alive: DEFAULT_KEEP_ALIVE,
            id_generator: Arc::new(UuidGenerator),
            encoder: Arc::new(WireEncoder),
        }
    }
}

impl ManagerBuilder {
    pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn encoder(mut self, encoder: Arc<dyn Encode>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn build(self) -> Manager {
        let registry = Arc::new(ClientRegistry::with_id_generator(self.id_generator));
        Manager {
            dispatcher: Dispatcher::new(registry.clone(), self.encoder),
            lifecycle: Lifecycle::new(registry.clone(), self.keep_alive),
            registry,
        }
    }
}
