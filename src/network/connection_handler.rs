use futures_util::StreamExt;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;

use crate::errors::LobbyResult;
use crate::lobby::Lobby;
use crate::network::auth::{AuthOutcome, Authenticator};
use crate::network::connection::{run_writer, ConnectionHandle};

pub struct ConnectionHandler;

impl ConnectionHandler {
    pub async fn handle_connection(
        stream: TcpStream,
        lobby: Arc<Lobby>,
        authenticator: Arc<dyn Authenticator>,
        lobby_path: Arc<str>,
    ) -> LobbyResult<()> {
        let mut outcome: Option<AuthOutcome> = None;

        // Unknown paths and failed authentication are refused during the
        // handshake, so those peers never complete the upgrade.
        let callback = |request: &Request,
                        response: Response|
         -> Result<Response, ErrorResponse> {
            if request.uri().path() != &*lobby_path {
                return Err(error_response(StatusCode::NOT_FOUND, "unknown endpoint"));
            }
            let result = authenticator.authenticate(request);
            let verdict = match &result {
                AuthOutcome::Authenticated(_) => Ok(response),
                AuthOutcome::Rejected(reason) => {
                    Err(error_response(StatusCode::UNAUTHORIZED, reason.as_str()))
                }
            };
            outcome = Some(result);
            verdict
        };

        let accepted = accept_hdr_async(stream, callback).await;
        let ws_stream = match accepted {
            Ok(ws_stream) => ws_stream,
            Err(e) => {
                match outcome {
                    Some(AuthOutcome::Rejected(reason)) => {
                        tracing::info!(reason = reason.as_str(), "🚫 Refused lobby upgrade");
                    }
                    _ => tracing::warn!(error = %e, "❌ WebSocket handshake failed"),
                }
                return Ok(());
            }
        };

        let (handle, outbound) = ConnectionHandle::channel();
        let connection_id = handle.id();
        let (ws_sender, mut ws_receiver) = ws_stream.split();
        let mut writer = tokio::spawn(run_writer(connection_id, ws_sender, outbound));
        tracing::debug!(%connection_id, "✅ WebSocket connection established");

        let identity = outcome.and_then(AuthOutcome::identity);
        if lobby
            .on_connection_opened(identity, handle.clone())
            .await
            .is_none()
        {
            drop(handle);
            let _ = writer.await;
            return Ok(());
        }

        let mut writer_finished = false;
        loop {
            tokio::select! {
                message = ws_receiver.next() => match message {
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(%connection_id, "👋 Connection requested close");
                        break;
                    }
                    Some(Ok(Message::Text(text))) => {
                        // The lobby channel is server-push only.
                        tracing::debug!(
                            %connection_id,
                            len = text.len(),
                            "Ignoring inbound text frame"
                        );
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::warn!(%connection_id, error = %e, "WebSocket read error");
                        break;
                    }
                },
                _ = &mut writer => {
                    writer_finished = true;
                    break;
                }
            }
        }

        lobby.on_connection_closed(&handle).await;
        drop(handle);
        if !writer_finished {
            let _ = writer.await;
        }

        tracing::debug!(%connection_id, "📴 Connection closed");
        Ok(())
    }
}

fn error_response(status: StatusCode, reason: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(reason.to_string()));
    *response.status_mut() = status;
    response
}
