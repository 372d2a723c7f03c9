//! The sidebar manager: one sidebar per connected client.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tallyboard_transport::ClientId;

use crate::{PacketLayer, ScoreboardSession, SessionConfig, SessionError};

/// Creates, tracks and tears down sidebars by client.
///
/// Unlike a session's own lock, the manager's lock is only held for map
/// reads and writes, never while packets are sent.
#[derive(Debug)]
pub struct SidebarManager {
    layer: Arc<PacketLayer>,
    config: SessionConfig,
    sessions: RwLock<HashMap<ClientId, Arc<ScoreboardSession>>>,
}

impl SidebarManager {
    pub fn new(layer: Arc<PacketLayer>, config: SessionConfig) -> Self {
        Self {
            layer,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn layer(&self) -> &Arc<PacketLayer> {
        &self.layer
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Creates and shows a sidebar for `client`.
    ///
    /// A client has at most one sidebar: an existing one is deleted and
    /// replaced.
    ///
    /// # Errors
    /// [`SessionError::OperationFailed`] if the new sidebar can't be shown.
    /// The previous one, if any, stays in place.
    pub fn create(&self, client: ClientId) -> Result<Arc<ScoreboardSession>, SessionError> {
        let session = Arc::new(ScoreboardSession::create(
            Arc::clone(&self.layer),
            client,
            self.config.clone(),
        )?);

        let previous = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(client, Arc::clone(&session));

        if let Some(previous) = previous {
            tracing::debug!(%client, id = previous.id(), "replacing sidebar");
            retire(&previous);
        }
        Ok(session)
    }

    /// The client's sidebar, if it has one.
    pub fn get(&self, client: ClientId) -> Option<Arc<ScoreboardSession>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&client)
            .cloned()
    }

    /// Deletes and forgets the client's sidebar. Returns `false` if it had
    /// none.
    pub fn remove(&self, client: ClientId) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&client);

        match removed {
            Some(session) => {
                retire(&session);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Deletes a session the manager no longer tracks. Its owner may already
/// have deleted it, and a client that left can't be sent anything anyway,
/// so failures are only logged.
fn retire(session: &ScoreboardSession) {
    match session.delete() {
        Ok(()) | Err(SessionError::Deleted(_)) => {}
        Err(e) => {
            tracing::warn!(id = session.id(), client = %session.client(), error = %e, "sidebar teardown failed");
        }
    }
}
