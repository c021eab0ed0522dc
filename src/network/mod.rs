pub mod auth;
pub mod connection;
pub mod connection_handler;
pub mod server;

pub use auth::{AuthOutcome, Authenticator, RejectReason, TokenAuthenticator};
pub use connection::{ConnectionHandle, ConnectionId};
pub use connection_handler::ConnectionHandler;
pub use server::WebsocketServer;
