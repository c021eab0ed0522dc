use std::borrow::Cow;
use std::fmt;

use futures_util::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use uuid::Uuid;

use crate::errors::{LobbyError, LobbyResult};

/// Close code sent to a connection replaced by a newer one from the same user.
pub const CLOSE_SUPERSEDED: u16 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cheap, cloneable reference to one open connection. Messages are queued
/// onto the connection's writer task, so sending never waits on the socket.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<Message>,
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

impl ConnectionHandle {
    /// Creates a handle together with the receiving end of its outbound
    /// queue. The receiver is normally drained by [`run_writer`].
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Self {
            id: ConnectionId::new(),
            sender,
        };
        (handle, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn send_text(&self, text: String) -> LobbyResult<()> {
        self.send(Message::Text(text))
    }

    pub fn close(&self, code: CloseCode, reason: &'static str) -> LobbyResult<()> {
        self.send(Message::Close(Some(CloseFrame {
            code,
            reason: Cow::Borrowed(reason),
        })))
    }

    pub fn close_superseded(&self) -> LobbyResult<()> {
        self.close(
            CloseCode::Library(CLOSE_SUPERSEDED),
            "superseded by a newer connection",
        )
    }

    fn send(&self, message: Message) -> LobbyResult<()> {
        if self.sender.is_closed() {
            return Err(LobbyError::ConnectionClosed {
                connection_id: self.id.to_string(),
            });
        }
        self.sender
            .send(message)
            .map_err(|_| LobbyError::MessageSendFailed {
                connection_id: self.id.to_string(),
            })
    }
}

/// Drains a connection's outbound queue into its socket sink. Stops after
/// forwarding a close frame, on the first write error, or once every handle
/// has been dropped.
pub async fn run_writer<S>(
    connection_id: ConnectionId,
    mut sink: S,
    mut receiver: mpsc::UnboundedReceiver<Message>,
) where
    S: Sink<Message, Error = WsError> + Unpin,
{
    while let Some(message) = receiver.recv().await {
        let closing = matches!(message, Message::Close(_));
        if let Err(e) = sink.send(message).await {
            tracing::warn!(%connection_id, error = %e, "❌ Failed to write to connection");
            break;
        }
        if closing {
            break;
        }
    }
    receiver.close();
    tracing::debug!(%connection_id, "writer stopped");
}
