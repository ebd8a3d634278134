use crate::connection::{Connection, ConnectionId};
use crate::id::{IdGenerator, UuidGenerator};
use crate::message::Group;
use dashmap::DashMap;
use log::*;
use serde_json::{Map, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

pub type ClientId = String;

/// Opaque key-value data attached to a client. Replaced wholesale, never merged.
pub type Metadata = Map<String, Value>;

/// One logical client and the live connections it currently holds.
///
/// Values handed out by the registry are snapshots; mutating them has no effect
/// on the registry.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: ClientId,
    pub metadata: Metadata,
    /// Unique by connection identity, in arrival order.
    pub connections: Vec<Connection>,
}

impl Client {
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

/// Process-wide mapping of group -> client id -> client.
///
/// Each group lives behind its own map shard lock, and every operation on a group
/// completes while holding it, so operations on one group are linearizable. No
/// lock is held while frames are written to connections.
pub struct ClientRegistry {
    groups: DashMap<Group, HashMap<ClientId, Client>>,
    id_generator: Arc<dyn IdGenerator>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(UuidGenerator))
    }

    pub fn with_id_generator(id_generator: Arc<dyn IdGenerator>) -> Self {
        let groups = DashMap::new();
        // The default group is always addressable.
        groups.insert(Group::Default, HashMap::new());

        Self {
            groups,
            id_generator,
        }
    }

    /// Adds `connection` to the client `(group, client_id)`, creating the client
    /// (and the group) on first sight. A missing or empty id is generated.
    ///
    /// Metadata is only applied when the client is created.
    pub fn register(
        &self,
        group: Group,
        client_id: Option<ClientId>,
        metadata: Option<Metadata>,
        connection: Connection,
    ) -> (ClientId, Client) {
        let client_id = client_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.id_generator.generate());

        let mut clients = self.groups.entry(group.clone()).or_default();
        let client = match clients.entry(client_id.clone()) {
            Entry::Occupied(entry) => {
                let client = entry.into_mut();
                if !client.connections.contains(&connection) {
                    client.connections.push(connection);
                }
                info!(
                    "New SSE connection for client {client_id} in group {group} ({} open)",
                    client.connections.len()
                );
                client
            }
            Entry::Vacant(entry) => {
                info!("New SSE client {client_id} in group {group}");
                entry.insert(Client {
                    id: client_id.clone(),
                    metadata: metadata.unwrap_or_default(),
                    connections: vec![connection],
                })
            }
        };

        (client_id, client.clone())
    }

    /// Removes a connection from a client, deleting the client when it was the
    /// last one. Absent clients or connections are ignored.
    ///
    /// Returns whether a connection was removed.
    pub fn unregister_connection(
        &self,
        group: &Group,
        client_id: &str,
        connection_id: &ConnectionId,
    ) -> bool {
        let Some(mut clients) = self.groups.get_mut(group) else {
            return false;
        };
        let Some(client) = clients.get_mut(client_id) else {
            debug!("SSE client {client_id} already removed from group {group}");
            return false;
        };

        let before = client.connections.len();
        client.connections.retain(|c| c.id() != connection_id);
        let removed = client.connections.len() != before;
        let now_empty = client.connections.is_empty();

        if now_empty {
            clients.remove(client_id);
            info!("SSE client {client_id} disconnected and removed from group {group}");
        } else if removed {
            debug!("Removed SSE connection {connection_id} from client {client_id}");
        }

        removed
    }

    pub fn lookup(&self, group: &Group, client_id: &str) -> Option<Client> {
        let client = self
            .groups
            .get(group)
            .and_then(|clients| clients.get(client_id).cloned());

        if client.is_none() {
            debug!("No SSE client with id {client_id} in group {group}");
        }
        client
    }

    /// Snapshot of every client in `group`. Empty for unknown groups.
    pub fn list(&self, group: &Group) -> Vec<Client> {
        self.groups
            .get(group)
            .map(|clients| clients.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of a client's connections, taken under the group lock.
    pub fn connections(&self, group: &Group, client_id: &str) -> Option<Vec<Connection>> {
        self.groups
            .get(group)
            .and_then(|clients| clients.get(client_id).map(|c| c.connections.clone()))
    }

    /// Snapshot of every `(client id, connections)` pair in `group`.
    pub fn group_connections(&self, group: &Group) -> Vec<(ClientId, Vec<Connection>)> {
        self.groups
            .get(group)
            .map(|clients| {
                clients
                    .values()
                    .map(|c| (c.id.clone(), c.connections.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_metadata(&self, group: &Group, client_id: &str, metadata: Metadata) -> Option<Client> {
        let mut clients = self.groups.get_mut(group)?;
        match clients.get_mut(client_id) {
            Some(client) => {
                client.metadata = metadata;
                Some(client.clone())
            }
            None => {
                debug!("No SSE client with id {client_id} in group {group}");
                None
            }
        }
    }

    pub fn client_count(&self, group: &Group) -> usize {
        self.groups.get(group).map(|clients| clients.len()).unwrap_or(0)
    }

    /// Every group that has ever been registered into, including empty ones.
    pub fn groups(&self) -> Vec<Group> {
        self.groups.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
