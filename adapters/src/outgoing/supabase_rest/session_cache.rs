use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use domain::session::{AuthIdentity, IdentityMetadata, Session};
use domain::user::UserId;
use storefront_application::error::AppResult;

/// Refresh this many seconds ahead of the provider's expiry.
const EXPIRY_MARGIN_SECS: i64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoTrueUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl GoTrueUser {
    pub fn identity(&self) -> AuthIdentity {
        let metadata = &self.user_metadata;
        AuthIdentity {
            id: UserId::from_uuid(self.id),
            email: self.email.clone(),
            metadata: IdentityMetadata {
                full_name: metadata.full_name.clone().or_else(|| metadata.name.clone()),
                first_name: metadata.first_name.clone(),
                last_name: metadata.last_name.clone(),
                phone: metadata.phone.clone(),
            },
        }
    }
}

/// Token set as issued by the provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: GoTrueUser,
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

impl StoredSession {
    pub fn needs_refresh(&self, now: OffsetDateTime) -> bool {
        self.to_session()
            .expires_within(now, Duration::seconds(EXPIRY_MARGIN_SECS))
    }

    pub fn to_session(&self) -> Session {
        Session {
            identity: self.user.identity(),
            expires_at: OffsetDateTime::from_unix_timestamp(self.expires_at).ok(),
        }
    }
}

/// In-memory current session, mirrored to a JSON file when configured.
pub struct SessionCache {
    current: RwLock<Option<StoredSession>>,
    file: Option<PathBuf>,
}

impl SessionCache {
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(None),
            file: None,
        }
    }

    /// Restores a previously persisted session. An unreadable file is logged
    /// and treated as no session.
    pub async fn load(file: Option<PathBuf>) -> Self {
        let mut restored = None;
        if let Some(path) = &file {
            match fs::read(path).await {
                Ok(bytes) => match serde_json::from_slice::<StoredSession>(&bytes) {
                    Ok(session) => {
                        debug!(user_id = %session.user.id, "Restored persisted session");
                        restored = Some(session);
                    }
                    Err(e) => warn!(path = %path.display(), "Ignoring corrupt session file: {}", e),
                },
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), "Failed to read session file: {}", e),
            }
        }

        Self {
            current: RwLock::new(restored),
            file,
        }
    }

    pub async fn get(&self) -> Option<StoredSession> {
        self.current.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    pub async fn store(&self, session: StoredSession) -> AppResult<()> {
        if let Some(path) = &self.file {
            let bytes = serde_json::to_vec(&session)?;
            fs::write(path, bytes).await?;
        }
        *self.current.write().await = Some(session);
        Ok(())
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
        if let Some(path) = &self.file {
            match fs::remove_file(path).await {
                Err(e) if e.kind() != ErrorKind::NotFound => {
                    warn!(path = %path.display(), "Failed to remove session file: {}", e);
                }
                _ => {}
            }
        }
    }
}
