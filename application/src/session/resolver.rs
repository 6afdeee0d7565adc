use tracing::{debug, info, instrument};

use crate::contracts::profile::{NewProfile, ProfileKey};
use crate::error::{AppError, AppResult};
use crate::ports::outgoing::profile_store::DynProfileStorePort;
use domain::session::AuthIdentity;
use domain::user::{PersonName, User};

/// Turns a provider identity into a [`User`], creating the profile row when
/// none exists yet (first federated login, or a registration whose profile
/// insert never landed).
pub struct ProfileResolver {
    profile_store: DynProfileStorePort,
}

impl ProfileResolver {
    pub fn new(profile_store: DynProfileStorePort) -> Self {
        Self { profile_store }
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.id))]
    pub async fn resolve(&self, identity: &AuthIdentity) -> AppResult<User> {
        if let Some(record) = self
            .profile_store
            .find_one(ProfileKey::Id(&identity.id))
            .await?
        {
            debug!("Found existing profile");
            return Ok(record.into());
        }

        let profile = Self::profile_for(identity);
        info!("No profile found, creating one from identity metadata");
        match self.profile_store.insert(profile).await {
            Ok(record) => Ok(record.into()),
            // Another resolution for the same identity inserted first.
            Err(AppError::Conflict { message }) => self
                .profile_store
                .find_one(ProfileKey::Id(&identity.id))
                .await?
                .map(User::from)
                .ok_or(AppError::Conflict { message }),
            Err(e) => Err(e),
        }
    }

    fn profile_for(identity: &AuthIdentity) -> NewProfile {
        let metadata = &identity.metadata;
        let name = match (&metadata.first_name, &metadata.last_name) {
            (None, None) => PersonName::from_full_name_hint(metadata.full_name.as_deref()),
            (first_name, last_name) => PersonName {
                first_name: first_name.clone().unwrap_or_default(),
                last_name: last_name.clone().unwrap_or_default(),
            },
        };

        NewProfile {
            id: identity.id,
            first_name: name.first_name,
            last_name: name.last_name,
            email: identity.email.clone().unwrap_or_default(),
            phone: metadata.phone.clone().filter(|phone| !phone.is_empty()),
        }
    }
}
