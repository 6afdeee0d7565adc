use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use tracing::{debug, instrument, warn};

use super::client::{ApiFailure, SupabaseClient};
use super::session_cache::SessionCache;
use domain::user::UserId;
use storefront_application::{
    contracts::profile::{NewProfile, ProfileChanges, ProfileKey, ProfileRecord},
    error::{AppError, AppResult},
    ports::outgoing::profile_store::ProfileStorePort,
};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const UNIQUE_VIOLATION: &str = "23505";

fn store_failure(failure: &ApiFailure, context: &str) -> AppError {
    let message = failure.message_or_status();
    if failure.status == StatusCode::CONFLICT
        || failure.body.code().as_deref() == Some(UNIQUE_VIOLATION)
    {
        debug!(context, "Profile constraint violated: {}", message);
        return AppError::Conflict {
            message: "A profile with this email address or phone number already exists."
                .to_string(),
        };
    }

    warn!(status = %failure.status, context, "Profile store request failed: {}", message);
    AppError::Persistence {
        message: format!("{context}: {message}"),
    }
}

/// [`ProfileStorePort`] over the hosted REST interface. Requests run as the
/// signed-in user when a session is cached, as the anonymous role otherwise.
pub struct PostgrestProfileStore {
    client: Arc<SupabaseClient>,
    cache: Arc<SessionCache>,
    table: String,
}

impl PostgrestProfileStore {
    pub fn new(client: Arc<SupabaseClient>, cache: Arc<SessionCache>, table: String) -> Self {
        Self {
            client,
            cache,
            table,
        }
    }

    async fn request(&self, method: Method) -> RequestBuilder {
        let token = self.cache.access_token().await;
        self.client
            .request(method, &self.client.rest_url(&self.table), token.as_deref())
    }
}

#[async_trait::async_trait]
impl ProfileStorePort for PostgrestProfileStore {
    /// Array query capped at one row. A single-object request would fold
    /// "several rows" into the same error as "no row".
    #[instrument(skip(self), fields(column = key.column()))]
    async fn find_one(&self, key: ProfileKey<'_>) -> AppResult<Option<ProfileRecord>> {
        let request = self.request(Method::GET).await.query(&[
            (key.column(), format!("eq.{}", key.value())),
            ("select", "*".to_string()),
            ("limit", "1".to_string()),
        ]);

        match self.client.send(request).await? {
            Ok(response) => {
                let rows: Vec<ProfileRecord> = SupabaseClient::json(response).await?;
                if rows.is_empty() {
                    debug!("No profile row matched");
                }
                Ok(rows.into_iter().next())
            }
            Err(failure) => Err(store_failure(&failure, "Failed to look up profile")),
        }
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    async fn insert(&self, profile: NewProfile) -> AppResult<ProfileRecord> {
        let request = self
            .request(Method::POST)
            .await
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(&profile);

        match self.client.send(request).await? {
            Ok(response) => SupabaseClient::json(response).await,
            Err(failure) => Err(store_failure(&failure, "Failed to create profile")),
        }
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: &UserId, changes: &ProfileChanges) -> AppResult<()> {
        let request = self
            .request(Method::PATCH)
            .await
            .query(&[("id", format!("eq.{id}"))])
            .json(changes);

        match self.client.send(request).await? {
            Ok(_) => Ok(()),
            Err(failure) => Err(store_failure(&failure, "Failed to update profile")),
        }
    }
}
