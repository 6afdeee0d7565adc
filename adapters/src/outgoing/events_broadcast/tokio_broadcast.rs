use tokio::sync::broadcast::{self, Sender};
use tracing::debug;

use domain::session::AuthEvent;
use storefront_application::ports::outgoing::auth_provider::AuthEventReceiver;

const DEFAULT_CAPACITY: usize = 64;

/// Fans provider session changes out to every subscriber.
pub struct TokioBroadcastAuthEvents {
    tx: Sender<AuthEvent>,
}

impl TokioBroadcastAuthEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: AuthEvent) {
        let kind = event.kind;
        if self.tx.send(event).is_err() {
            debug!(?kind, "No subscribers for auth event");
        }
    }

    pub fn subscribe(&self) -> AuthEventReceiver {
        self.tx.subscribe()
    }
}

impl Default for TokioBroadcastAuthEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
