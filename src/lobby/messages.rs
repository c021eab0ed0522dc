use serde::{Deserialize, Serialize};

use crate::lobby::identity::{Identity, PresenceRecord, UserId};

/// Every lobby frame is `{"type": ..., "payload": ...}` so new kinds can be
/// added without touching the shape of existing ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LobbyEvent {
    UserCount(usize),
    UserJoin(Identity),
    UserLeave {
        #[serde(rename = "userId")]
        user_id: UserId,
    },
    UserList(Vec<PresenceRecord>),
}

impl LobbyEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            LobbyEvent::UserCount(_) => "USER_COUNT",
            LobbyEvent::UserJoin(_) => "USER_JOIN",
            LobbyEvent::UserLeave { .. } => "USER_LEAVE",
            LobbyEvent::UserList(_) => "USER_LIST",
        }
    }
}

pub fn serialize_event(event: &LobbyEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

pub fn deserialize_event(json: &str) -> Result<LobbyEvent, serde_json::Error> {
    serde_json::from_str(json)
}
