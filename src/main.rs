use std::sync::Arc;

use clap::Parser;
use omok_lobby::config::Config;
use omok_lobby::network::WebsocketServer;
use omok_lobby::Lobby;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    config.validate()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("omok_lobby=info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!("🎮 Starting omok lobby server v{}", env!("CARGO_PKG_VERSION"));

    let authenticator = config.load_authenticator()?;
    tracing::info!(users = authenticator.len(), "Loaded lobby credentials");

    let lobby = Arc::new(Lobby::new());
    let server = WebsocketServer::bind(
        config.listen_address(),
        &config.path,
        lobby,
        Arc::new(authenticator),
    )
    .await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down lobby server");
        }
    }

    Ok(())
}
