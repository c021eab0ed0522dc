use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::errors::{LobbyError, LobbyResult};
use crate::lobby::identity::Identity;
use crate::network::auth::TokenAuthenticator;

/// Omok lobby presence server
#[derive(Parser, Clone, Debug)]
#[command(name = "omok-lobby", version, about = "Omok lobby presence server")]
pub struct Config {
    /// Bind address
    #[arg(long, env = "LOBBY_BIND_ADDRESS", default_value = "127.0.0.1")]
    pub bind_address: String,

    /// Port to listen on
    #[arg(long, env = "LOBBY_PORT", default_value = "8080")]
    pub port: u16,

    /// WebSocket path of the lobby channel
    #[arg(long, env = "LOBBY_PATH", default_value = "/ws/lobby")]
    pub path: String,

    /// TOML file with the accepted user tokens
    #[arg(long, env = "LOBBY_USERS_FILE", default_value = "./lobby-users.toml")]
    pub users: PathBuf,

    /// Emit JSON log lines instead of human-readable output
    #[arg(long, env = "LOBBY_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn validate(&self) -> LobbyResult<()> {
        if !self.path.starts_with('/') {
            return Err(LobbyError::ConfigError {
                message: format!("lobby path '{}' must start with '/'", self.path),
            });
        }
        Ok(())
    }

    pub fn load_authenticator(&self) -> LobbyResult<TokenAuthenticator> {
        load_users_file(&self.users)
    }
}

#[derive(Debug, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    token: String,
    user_id: i64,
    username: String,
}

pub fn load_users_file(path: &Path) -> LobbyResult<TokenAuthenticator> {
    let raw = std::fs::read_to_string(path).map_err(|e| LobbyError::ConfigError {
        message: format!("cannot read {}: {}", path.display(), e),
    })?;
    parse_users(&raw)
}

pub fn parse_users(raw: &str) -> LobbyResult<TokenAuthenticator> {
    let file: UsersFile = toml::from_str(raw)?;
    TokenAuthenticator::from_entries(
        file.users
            .into_iter()
            .map(|entry| (entry.token, Identity::new(entry.user_id, entry.username))),
    )
}
