use axum::extract::ws::{Message, WebSocket};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::protocol::WSMessage;
use crate::shared::app_state::AppState;
use storefront_application::session::state::SessionSnapshot;

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] axum::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConnectionResult<T> = Result<T, ConnectionError>;

pub struct ConnectionCounterGuard {
    state: AppState,
}

impl ConnectionCounterGuard {
    pub fn new(state: AppState) -> Self {
        state.increment_websocket_connections();
        Self { state }
    }
}

impl Drop for ConnectionCounterGuard {
    fn drop(&mut self) {
        self.state.decrement_websocket_connections();
    }
}

pub struct SessionFeed {
    socket_sender: SplitSink<WebSocket, Message>,
    message_receiver: SplitStream<WebSocket>,
    updates: watch::Receiver<SessionSnapshot>,
    _connection_counter_guard: ConnectionCounterGuard,
}

impl SessionFeed {
    pub fn new(socket: WebSocket, state: &AppState) -> Self {
        let (socket_sender, message_receiver) = socket.split();
        Self {
            socket_sender,
            message_receiver,
            updates: state.session_use_case.subscribe(),
            _connection_counter_guard: ConnectionCounterGuard::new(state.clone()),
        }
    }

    pub async fn run(mut self) {
        info!("Live session subscriber connected");

        let initial = self.updates.borrow_and_update().clone();
        if let Err(e) = self.send(WSMessage::session(initial)).await {
            debug!("Failed to send initial snapshot: {}", e);
            return;
        }

        loop {
            tokio::select! {
                changed = self.updates.changed() => {
                    if changed.is_err() {
                        debug!("Session store dropped, closing live feed");
                        break;
                    }
                    let snapshot = self.updates.borrow_and_update().clone();
                    if let Err(e) = self.send(WSMessage::session(snapshot)).await {
                        debug!("Failed to push session snapshot: {}", e);
                        break;
                    }
                }

                client_msg = self.message_receiver.next() => {
                    if !self.handle_client_message(client_msg).await {
                        break;
                    }
                }
            }
        }

        info!("Live session subscriber disconnected");
    }

    /// Returns `false` once the connection should be closed.
    async fn handle_client_message(&mut self, msg: Option<Result<Message, axum::Error>>) -> bool {
        match msg {
            Some(Ok(Message::Close(_))) | None => false,
            Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                let reply = WSMessage::Error {
                    message: "This feed is read-only".to_string(),
                };
                self.send(reply).await.is_ok()
            }
            Some(Ok(_)) => true,
            Some(Err(e)) => {
                warn!("WebSocket receive error: {}", e);
                false
            }
        }
    }

    async fn send(&mut self, message: WSMessage) -> ConnectionResult<()> {
        let json = serde_json::to_string(&message)?;
        self.socket_sender.send(Message::Text(json.into())).await?;
        Ok(())
    }
}
