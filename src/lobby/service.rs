use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use crate::lobby::broadcaster::LobbyBroadcaster;
use crate::lobby::identity::{Identity, PresenceRecord};
use crate::lobby::registry::ConnectionRegistry;
use crate::network::connection::ConnectionHandle;

/// Entry point the transport drives: one call when a connection opens and
/// one when it closes.
///
/// Membership transitions (admit and announce, remove and announce) are
/// applied one at a time. Everything done under the lock is an in-memory map
/// update or a queue push, so a slow peer never holds it up.
pub struct Lobby {
    registry: Arc<ConnectionRegistry>,
    broadcaster: LobbyBroadcaster,
    transitions: Mutex<()>,
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}

impl Lobby {
    pub fn new() -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            broadcaster: LobbyBroadcaster::new(registry.clone()),
            registry,
            transitions: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Admits an authenticated connection and announces it. Connections
    /// without a usable identity are closed before anything is recorded or
    /// broadcast, and `None` is returned.
    pub async fn on_connection_opened(
        &self,
        identity: Option<Identity>,
        handle: ConnectionHandle,
    ) -> Option<PresenceRecord> {
        let Some(identity) = identity.filter(|identity| !identity.is_anonymous()) else {
            Self::reject(&handle);
            return None;
        };

        let _guard = self.transitions.lock().await;

        let admission = match self.registry.admit(identity, handle.clone()) {
            Ok(admission) => admission,
            Err(e) => {
                tracing::warn!(connection_id = %handle.id(), error = %e, "Admission refused");
                Self::reject(&handle);
                return None;
            }
        };

        if let Some(previous) = &admission.replaced {
            tracing::info!(
                user_id = %admission.record.user_id,
                old_connection = %previous.id(),
                new_connection = %handle.id(),
                "🔁 Replacing previous lobby connection"
            );
            if let Err(e) = previous.close_superseded() {
                tracing::debug!(error = %e, "Previous connection already gone");
            }
        }

        self.broadcaster.on_join(&admission.record, &handle);
        Some(admission.record)
    }

    /// Removes the connection if it is still its user's current one and
    /// announces the departure. Superseded connections close silently.
    pub async fn on_connection_closed(
        &self,
        handle: &ConnectionHandle,
    ) -> Option<PresenceRecord> {
        let _guard = self.transitions.lock().await;

        let removed = self.registry.remove_by_handle(handle);
        if removed.is_none() {
            tracing::debug!(connection_id = %handle.id(), "Closed connection was not current");
        }
        self.broadcaster
            .on_leave(removed.as_ref().map(|record| record.user_id));
        removed
    }

    fn reject(handle: &ConnectionHandle) {
        tracing::info!(
            connection_id = %handle.id(),
            "🚫 Rejecting unauthenticated lobby connection"
        );
        if let Err(e) = handle.close(CloseCode::Policy, "authentication required") {
            tracing::debug!(error = %e, "Rejected connection already gone");
        }
    }
}
