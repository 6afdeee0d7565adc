use std::sync::Arc;

use crate::contracts::profile::{NewProfile, ProfileChanges, ProfileKey, ProfileRecord};
use crate::error::AppResult;
use domain::user::UserId;

/// Application-owned profile table. `find_one` returns `Ok(None)` when no row
/// matches; only real failures are errors. Unique-constraint violations on
/// insert or update surface as `AppError::Conflict`.
#[async_trait::async_trait]
pub trait ProfileStorePort: Send + Sync {
    async fn find_one(&self, key: ProfileKey<'_>) -> AppResult<Option<ProfileRecord>>;
    async fn insert(&self, profile: NewProfile) -> AppResult<ProfileRecord>;
    async fn update(&self, id: &UserId, changes: &ProfileChanges) -> AppResult<()>;
}

pub type DynProfileStorePort = Arc<dyn ProfileStorePort>;
