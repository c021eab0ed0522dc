use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize, Clone, PartialEq, Eq)]
pub enum LobbyError {
    #[error("Connection carries no authenticated identity")]
    Unauthenticated,

    // Connection-related errors
    #[error("Connection '{connection_id}' is already closed")]
    ConnectionClosed { connection_id: String },

    #[error("Failed to send message to connection '{connection_id}'")]
    MessageSendFailed { connection_id: String },

    // Serialization errors
    #[error("Failed to serialize lobby event: {message}")]
    SerializationError { message: String },

    #[error("WebSocket error: {message}")]
    WebSocketError { message: String },

    // Startup errors
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

pub type LobbyResult<T> = Result<T, LobbyError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ClientError,
    ServerError,
    ConfigError,
}

impl LobbyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LobbyError::Unauthenticated | LobbyError::ConnectionClosed { .. } => {
                ErrorCategory::ClientError
            }

            LobbyError::MessageSendFailed { .. }
            | LobbyError::SerializationError { .. }
            | LobbyError::WebSocketError { .. }
            | LobbyError::Io { .. } => ErrorCategory::ServerError,

            LobbyError::ConfigError { .. } => ErrorCategory::ConfigError,
        }
    }

    /// Closed peers are expected during broadcasts and stay at debug level.
    pub fn should_log(&self) -> bool {
        !matches!(self.category(), ErrorCategory::ClientError)
    }
}

impl From<serde_json::Error> for LobbyError {
    fn from(err: serde_json::Error) -> Self {
        LobbyError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for LobbyError {
    fn from(err: std::io::Error) -> Self {
        LobbyError::Io {
            message: err.to_string(),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for LobbyError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        LobbyError::WebSocketError {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LobbyError {
    fn from(err: toml::de::Error) -> Self {
        LobbyError::ConfigError {
            message: err.to_string(),
        }
    }
}
