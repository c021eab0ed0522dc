use std::sync::Arc;

use crate::errors::{LobbyError, LobbyResult};
use crate::lobby::identity::{PresenceRecord, UserId};
use crate::lobby::messages::{serialize_event, LobbyEvent};
use crate::lobby::registry::ConnectionRegistry;
use crate::network::connection::{ConnectionHandle, ConnectionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
    pub error: LobbyError,
}

/// Outcome of delivering one event. Failed recipients are reported here
/// rather than raised, so one dead peer never hides the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub kind: &'static str,
    pub delivered: usize,
    pub failed: Vec<DeliveryFailure>,
}

impl BroadcastReport {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            delivered: 0,
            failed: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct LobbyBroadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl LobbyBroadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Announces a freshly admitted member: the joiner first gets the full
    /// membership list, then everyone gets the new count and the join.
    pub fn on_join(
        &self,
        record: &PresenceRecord,
        handle: &ConnectionHandle,
    ) -> Vec<BroadcastReport> {
        let mut reports = Vec::with_capacity(3);

        let snapshot = LobbyEvent::UserList(self.registry.snapshot());
        match self.send_to(record.user_id, handle, &snapshot) {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(user_id = %record.user_id, error = %e, "Failed to build user list")
            }
        }

        let count = self.registry.count();
        reports.extend(self.broadcast_logged(&LobbyEvent::UserCount(count)));
        reports.extend(self.broadcast_logged(&LobbyEvent::UserJoin(record.identity())));

        tracing::info!(
            user_id = %record.user_id,
            username = %record.username,
            count,
            "👋 User joined the lobby"
        );
        reports
    }

    /// Announces a departure to the remaining members. `None` means the
    /// closing connection had already been superseded, so nothing is sent.
    pub fn on_leave(&self, user_id: Option<UserId>) -> Vec<BroadcastReport> {
        let Some(user_id) = user_id else {
            return Vec::new();
        };

        let count = self.registry.count();
        let mut reports = Vec::with_capacity(2);
        reports.extend(self.broadcast_logged(&LobbyEvent::UserCount(count)));
        reports.extend(self.broadcast_logged(&LobbyEvent::UserLeave { user_id }));

        tracing::info!(%user_id, count, "📴 User left the lobby");
        reports
    }

    /// Serializes `event` once and offers it to every connection currently
    /// in the registry. Only a serialization failure is returned as an error,
    /// in which case nobody receives anything.
    pub fn broadcast(&self, event: &LobbyEvent) -> LobbyResult<BroadcastReport> {
        let json = serialize_event(event)?;
        tracing::debug!(kind = event.kind(), payload = %json, "📢 Broadcasting");

        let mut report = BroadcastReport::new(event.kind());
        for (user_id, handle) in self.registry.recipients() {
            Self::deliver(&mut report, user_id, &handle, &json);
        }
        Ok(report)
    }

    pub fn send_to(
        &self,
        user_id: UserId,
        handle: &ConnectionHandle,
        event: &LobbyEvent,
    ) -> LobbyResult<BroadcastReport> {
        let json = serialize_event(event)?;
        let mut report = BroadcastReport::new(event.kind());
        Self::deliver(&mut report, user_id, handle, &json);
        Ok(report)
    }

    fn broadcast_logged(&self, event: &LobbyEvent) -> Option<BroadcastReport> {
        match self.broadcast(event) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(kind = event.kind(), error = %e, "Dropping lobby broadcast");
                None
            }
        }
    }

    fn deliver(
        report: &mut BroadcastReport,
        user_id: UserId,
        handle: &ConnectionHandle,
        json: &str,
    ) {
        match handle.send_text(json.to_string()) {
            Ok(()) => report.delivered += 1,
            Err(error) => {
                if error.should_log() {
                    tracing::warn!(
                        connection_id = %handle.id(),
                        error = %error,
                        "❌ Failed to deliver lobby event"
                    );
                } else {
                    tracing::debug!(
                        connection_id = %handle.id(),
                        error = %error,
                        "Skipping closed connection"
                    );
                }
                report.failed.push(DeliveryFailure {
                    user_id,
                    connection_id: handle.id(),
                    error,
                });
            }
        }
    }
}
