//! Thread-safe client-to-connection map.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::{ClientId, Connection, ConnectionResolver};

/// The default [`ConnectionResolver`]: connections registered by client.
///
/// Reads (one per sent packet) vastly outnumber writes (one per connect
/// and disconnect), hence the `RwLock`.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ClientId, Arc<dyn Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection under its client, replacing any previous one.
    pub fn register(&self, connection: Arc<dyn Connection>) {
        let client = connection.client();
        let replaced = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(client, connection)
            .is_some();
        tracing::debug!(%client, replaced, "connection registered");
    }

    /// Removes a client's connection. Returns `true` if one was registered.
    pub fn deregister(&self, client: ClientId) -> bool {
        let removed = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&client)
            .is_some();
        if removed {
            tracing::debug!(%client, "connection deregistered");
        }
        removed
    }

    pub fn contains(&self, client: ClientId) -> bool {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&client)
    }

    pub fn len(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConnectionResolver for ConnectionRegistry {
    fn resolve(&self, client: ClientId) -> Option<Arc<dyn Connection>> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&client)
            .cloned()
    }
}
