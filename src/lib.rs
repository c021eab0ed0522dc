pub mod config;
pub mod errors;
pub mod lobby;
pub mod network;


// Re-export commonly used items for convenience
pub use errors::{LobbyError, LobbyResult};
pub use lobby::{ConnectionRegistry, Identity, Lobby, LobbyBroadcaster, LobbyEvent, UserId};
pub use network::{ConnectionHandle, TokenAuthenticator, WebsocketServer};
