use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder principal name handed out by upstream auth layers for
/// anonymous sessions. Never admitted to the lobby.
pub const ANONYMOUS_USERNAME: &str = "anonymousUser";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verified identity attached to a connection by the authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id),
            username: username.into(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        let name = self.username.trim();
        name.is_empty() || name == ANONYMOUS_USERNAME
    }
}

/// Lobby-level activity. Only `Waiting` is assigned today; the other states
/// belong to matchmaking and game rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceStatus {
    Waiting,
    Matching,
    InGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub user_id: UserId,
    pub username: String,
    pub status: PresenceStatus,
}

impl PresenceRecord {
    pub fn waiting(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            username: identity.username,
            status: PresenceStatus::Waiting,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            username: self.username.clone(),
        }
    }
}
