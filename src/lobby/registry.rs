use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::errors::{LobbyError, LobbyResult};
use crate::lobby::identity::{Identity, PresenceRecord, UserId};
use crate::network::connection::{ConnectionHandle, ConnectionId};

#[derive(Debug, Clone)]
struct LobbyEntry {
    record: PresenceRecord,
    handle: ConnectionHandle,
    admitted_at: u64,
}

/// Result of a successful [`ConnectionRegistry::admit`].
#[derive(Debug)]
pub struct Admission {
    pub record: PresenceRecord,
    /// The user's previous connection, which the caller is expected to close.
    pub replaced: Option<ConnectionHandle>,
}

/// Who is in the lobby right now.
///
/// Each user has one combined entry holding both the presence record and the
/// live connection handle, so the two can never drift apart. `owners` is a
/// side index for resolving a closing handle back to its user; `entries`
/// stays authoritative and a handle only counts as current while the user's
/// entry still holds it.
///
/// Mutations for the same user are serialized by the map's per-key locking;
/// different users proceed in parallel. Nothing here performs I/O.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: DashMap<UserId, LobbyEntry>,
    owners: DashMap<ConnectionId, UserId>,
    admissions: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&self, identity: Identity, handle: ConnectionHandle) -> LobbyResult<Admission> {
        if identity.is_anonymous() {
            return Err(LobbyError::Unauthenticated);
        }

        let user_id = identity.user_id;
        let connection_id = handle.id();
        let record = PresenceRecord::waiting(identity);
        let admitted_at = self.admissions.fetch_add(1, Ordering::Relaxed);

        self.owners.insert(connection_id, user_id);
        let previous = self.entries.insert(
            user_id,
            LobbyEntry {
                record: record.clone(),
                handle,
                admitted_at,
            },
        );

        let replaced = previous
            .map(|entry| entry.handle)
            .filter(|old| old.id() != connection_id);
        if let Some(old) = &replaced {
            self.owners.remove(&old.id());
        }

        tracing::debug!(
            %user_id,
            %connection_id,
            replaced = replaced.is_some(),
            "📝 Admitted connection"
        );
        Ok(Admission { record, replaced })
    }

    pub fn remove(&self, user_id: UserId) -> Option<PresenceRecord> {
        let (_, entry) = self.entries.remove(&user_id)?;
        self.owners.remove(&entry.handle.id());
        tracing::debug!(%user_id, "🗑️ Removed user");
        Some(entry.record)
    }

    /// Removes the user owning `handle`, but only while `handle` is still that
    /// user's current connection. A handle already superseded by a newer
    /// admission yields `None`.
    pub fn remove_by_handle(&self, handle: &ConnectionHandle) -> Option<PresenceRecord> {
        let connection_id = handle.id();
        let (_, user_id) = self.owners.remove(&connection_id)?;
        let (_, entry) = self
            .entries
            .remove_if(&user_id, |_, entry| entry.handle.id() == connection_id)?;
        tracing::debug!(%user_id, %connection_id, "🗑️ Removed connection");
        Some(entry.record)
    }

    /// Point-in-time copy of the membership, in admission order.
    pub fn snapshot(&self) -> Vec<PresenceRecord> {
        let mut entries: Vec<(u64, PresenceRecord)> = self
            .entries
            .iter()
            .map(|entry| (entry.admitted_at, entry.record.clone()))
            .collect();
        entries.sort_by_key(|(admitted_at, _)| *admitted_at);
        entries.into_iter().map(|(_, record)| record).collect()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Live handles to deliver one broadcast to, in admission order.
    pub fn recipients(&self) -> Vec<(UserId, ConnectionHandle)> {
        let mut recipients: Vec<(u64, UserId, ConnectionHandle)> = self
            .entries
            .iter()
            .map(|entry| (entry.admitted_at, *entry.key(), entry.handle.clone()))
            .collect();
        recipients.sort_by_key(|(admitted_at, _, _)| *admitted_at);
        recipients
            .into_iter()
            .map(|(_, user_id, handle)| (user_id, handle))
            .collect()
    }

    pub fn handle_of(&self, user_id: UserId) -> Option<ConnectionHandle> {
        self.entries.get(&user_id).map(|entry| entry.handle.clone())
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.entries.contains_key(&user_id)
    }
}
