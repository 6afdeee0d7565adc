use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};

use super::connection::SessionFeed;
use crate::shared::app_state::AppState;

/// Upgrades to a WebSocket that receives the current session snapshot and
/// then one message per change.
pub async fn session_live_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| SessionFeed::new(socket, &state).run())
}
