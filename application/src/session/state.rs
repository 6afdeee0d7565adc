use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use domain::user::{User, UserId, UserPatch};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    Initializing,
    Anonymous,
    Resolving,
    Authenticated,
    /// A provider session exists but no profile could be resolved for it.
    Degraded { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_loading: bool,
    pub status: SessionStatus,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
            status: SessionStatus::Initializing,
        }
    }
}

/// Sole owner of the in-process session state. Every mutation goes through
/// here and wakes all subscribers.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    pub fn set_user(&self, user: User) {
        self.tx.send_modify(|state| {
            state.user = Some(user);
            state.status = SessionStatus::Authenticated;
        });
    }

    /// Drops the user ahead of a profile resolution so nothing stale is
    /// visible while it runs.
    pub fn begin_resolution(&self) {
        self.tx.send_modify(|state| {
            state.user = None;
            state.status = SessionStatus::Resolving;
        });
    }

    pub fn clear_user(&self) {
        self.tx.send_modify(|state| {
            state.user = None;
            state.status = SessionStatus::Anonymous;
        });
    }

    pub fn mark_degraded(&self, reason: String) {
        self.tx.send_modify(|state| {
            state.user = None;
            state.status = SessionStatus::Degraded { reason };
        });
    }

    /// Merges `patch` into the current user when it is still `id`. Returns
    /// `false` when nobody is signed in or another user took over.
    pub fn merge_user(&self, id: &UserId, patch: &UserPatch) -> bool {
        self.tx.send_if_modified(|state| match state.user.as_mut() {
            Some(user) if user.id == *id => {
                user.apply(patch);
                true
            }
            _ => false,
        })
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.tx.send_if_modified(|state| {
            if state.is_loading == is_loading {
                return false;
            }
            state.is_loading = is_loading;
            true
        });
    }

    /// Marks the store as loading until the returned guard is dropped.
    #[must_use = "loading is reset as soon as the guard is dropped"]
    pub fn loading(&self) -> LoadingGuard {
        self.set_loading(true);
        LoadingGuard {
            store: self.clone(),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

pub struct LoadingGuard {
    store: SessionStore,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.store.set_loading(false);
    }
}
