use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};

use crate::errors::LobbyResult;
use crate::lobby::Lobby;
use crate::network::auth::Authenticator;
use crate::network::connection_handler::ConnectionHandler;

pub struct WebsocketServer {
    listener: TcpListener,
    lobby_path: Arc<str>,
    lobby: Arc<Lobby>,
    authenticator: Arc<dyn Authenticator>,
}

impl WebsocketServer {
    pub async fn bind(
        address: impl ToSocketAddrs,
        lobby_path: &str,
        lobby: Arc<Lobby>,
        authenticator: Arc<dyn Authenticator>,
    ) -> LobbyResult<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self {
            listener,
            lobby_path: Arc::from(lobby_path),
            lobby,
            authenticator,
        })
    }

    pub fn local_addr(&self) -> LobbyResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> LobbyResult<()> {
        tracing::info!(
            address = %self.local_addr()?,
            path = %self.lobby_path,
            "🌐 Lobby server listening"
        );

        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            };
            tracing::debug!(%addr, "🔗 New connection");

            let lobby = self.lobby.clone();
            let authenticator = self.authenticator.clone();
            let lobby_path = self.lobby_path.clone();

            tokio::spawn(async move {
                if let Err(e) =
                    ConnectionHandler::handle_connection(stream, lobby, authenticator, lobby_path)
                        .await
                {
                    tracing::warn!(%addr, error = %e, "❌ Error handling connection");
                }
            });
        }
    }
}
