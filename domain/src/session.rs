use time::{Duration, OffsetDateTime};

use crate::user::UserId;

/// Attributes the provider attaches to an identity. Federated logins carry a
/// `full_name`; password sign-ups carry the fields submitted at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMetadata {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub id: UserId,
    pub email: Option<String>,
    pub metadata: IdentityMetadata,
}

/// Provider-issued session, reduced to what this service reads from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: AuthIdentity,
    pub expires_at: Option<OffsetDateTime>,
}

impl Session {
    pub fn new(identity: AuthIdentity) -> Self {
        Self {
            identity,
            expires_at: None,
        }
    }

    pub fn expires_within(&self, now: OffsetDateTime, margin: Duration) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= now + margin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

impl AuthEvent {
    pub fn signed_in(session: Session) -> Self {
        Self {
            kind: AuthEventKind::SignedIn,
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            kind: AuthEventKind::SignedOut,
            session: None,
        }
    }

    pub fn with_session(kind: AuthEventKind, session: Session) -> Self {
        Self {
            kind,
            session: Some(session),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}
