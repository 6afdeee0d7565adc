use std::sync::Arc;

use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::ports::outgoing::auth_provider::AuthEventReceiver;
use crate::session::resolver::ProfileResolver;
use crate::session::state::SessionStore;
use domain::session::{AuthEvent, AuthEventKind, Session};

/// Applies provider session-change events to the [`SessionStore`].
pub struct SessionEventListener {
    resolver: Arc<ProfileResolver>,
    state: SessionStore,
}

impl SessionEventListener {
    pub fn new(resolver: Arc<ProfileResolver>, state: SessionStore) -> Self {
        Self { resolver, state }
    }

    pub async fn handle_event(&self, event: AuthEvent) {
        debug!(kind = ?event.kind, has_session = event.session.is_some(), "Auth event");

        match (event.kind, event.session) {
            (AuthEventKind::SignedIn, Some(session)) => {
                self.state.begin_resolution();
                resolve_into(&self.resolver, &self.state, &session).await;
            }
            (AuthEventKind::SignedOut, _) | (_, None) => {
                self.state.clear_user();
            }
            (_, Some(_)) => {}
        }

        self.state.set_loading(false);
    }

    /// Consumes events until the provider channel closes or `shutdown` flips.
    pub fn spawn(
        self,
        mut events: AuthEventReceiver,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Session event listener unsubscribed");
                            break;
                        }
                    }
                    received = events.recv() => match received {
                        Ok(event) => self.handle_event(event).await,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Session event listener lagged behind provider events");
                        }
                        Err(RecvError::Closed) => {
                            info!("Auth provider event stream closed");
                            break;
                        }
                    },
                }
            }
        })
    }
}

/// Resolves `session` into the store. Failures leave the user absent and
/// flag the session as degraded.
pub(crate) async fn resolve_into(
    resolver: &ProfileResolver,
    state: &SessionStore,
    session: &Session,
) {
    match resolver.resolve(&session.identity).await {
        Ok(user) => state.set_user(user),
        Err(e) => {
            error!(user_id = %session.identity.id, "Error resolving user profile: {}", e);
            state.mark_degraded(e.to_string());
        }
    }
}
