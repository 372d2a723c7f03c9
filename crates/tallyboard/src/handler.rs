//! Per-client handler: sidebar creation, the caller's hook, teardown.
//!
//! Each accepted client gets its own Tokio task running this handler.
//! The flow is:
//!   1. Create and show the client's sidebar
//!   2. Run [`SidebarHandler::on_connect`] until it returns or the client
//!      disconnects, whichever comes first
//!   3. Wait for the disconnect, then remove the sidebar

use std::future::Future;
use std::sync::Arc;

use tallyboard_session::ScoreboardSession;
use tallyboard_transport::{AcceptedClient, ClientId, ConnectionRegistry};
use tokio::task::JoinHandle;

use crate::TallyboardError;
use crate::server::ServerState;

/// What a server does with each client's sidebar.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use tallyboard::prelude::*;
///
/// struct Welcome;
///
/// impl SidebarHandler for Welcome {
///     async fn on_connect(&self, sidebar: Arc<ScoreboardSession>) {
///         let _ = sidebar.update_title("§6Welcome");
///         let _ = sidebar.update_lines([format!("You are {}", sidebar.client())]);
///     }
/// }
/// ```
pub trait SidebarHandler: Send + Sync + 'static {
    /// Called once the client's sidebar is shown.
    ///
    /// The future may run for the client's whole visit (a ticking
    /// scoreboard, for instance). It is dropped when the client
    /// disconnects.
    fn on_connect(
        &self,
        sidebar: Arc<ScoreboardSession>,
    ) -> impl Future<Output = ()> + Send;

    /// Called after the client's sidebar has been removed.
    fn on_disconnect(&self, client: ClientId) {
        let _ = client;
    }
}

/// Removes the client's sidebar when the handler exits, including when
/// its task is aborted or panics.
struct SidebarGuard<H: SidebarHandler> {
    client: ClientId,
    state: Arc<ServerState<H>>,
}

impl<H: SidebarHandler> Drop for SidebarGuard<H> {
    fn drop(&mut self) {
        self.state.manager.remove(self.client);
        self.state.handler.on_disconnect(self.client);
    }
}

/// Drops a client whose sidebar couldn't be created. An aborted pump never
/// reaches its own deregistration, so the connection is removed here.
fn abandon(client: ClientId, pump: JoinHandle<()>, registry: &ConnectionRegistry) {
    pump.abort();
    registry.deregister(client);
}

/// Handles a single client from accept to disconnect.
pub(crate) async fn handle_client<H: SidebarHandler>(
    accepted: AcceptedClient,
    state: Arc<ServerState<H>>,
) -> Result<(), TallyboardError> {
    let AcceptedClient {
        client,
        addr,
        mut pump,
    } = accepted;

    let sidebar = match state.manager.create(client) {
        Ok(sidebar) => sidebar,
        Err(e) => {
            abandon(client, pump, &state.registry);
            return Err(e.into());
        }
    };
    let _guard = SidebarGuard {
        client,
        state: Arc::clone(&state),
    };
    tracing::info!(%client, %addr, id = sidebar.id(), "client connected");

    tokio::select! {
        _ = &mut pump => {}
        () = state.handler.on_connect(sidebar) => {
            let _ = pump.await;
        }
    }

    tracing::info!(%client, "client disconnected");
    Ok(())
}
