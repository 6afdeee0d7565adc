use serde::Serialize;

use crate::incoming::http_axum::dto::responses::SessionResponse;
use storefront_application::session::state::SessionSnapshot;

/// Messages pushed from the server to a live session subscriber.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum WSMessage {
    #[serde(rename = "session")]
    Session(SessionResponse),
    #[serde(rename = "error")]
    Error { message: String },
}

impl WSMessage {
    pub fn session(snapshot: SessionSnapshot) -> Self {
        Self::Session(snapshot.into())
    }
}
