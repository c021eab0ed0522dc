pub mod broadcaster;
pub mod identity;
pub mod messages;
pub mod registry;
pub mod service;

pub use broadcaster::{BroadcastReport, DeliveryFailure, LobbyBroadcaster};
pub use identity::{Identity, PresenceRecord, PresenceStatus, UserId};
pub use messages::LobbyEvent;
pub use registry::{Admission, ConnectionRegistry};
pub use service::Lobby;
