use tokio::sync::watch;

use crate::contracts::auth::{OAuthRedirect, OperationStatus, RegistrationOutcome};
use crate::error::AppResult;
use crate::session::state::SessionSnapshot;
use domain::user::{User, UserPatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[async_trait::async_trait]
pub trait SessionUseCase: Send + Sync {
    fn snapshot(&self) -> SessionSnapshot;
    fn subscribe(&self) -> watch::Receiver<SessionSnapshot>;

    async fn login(&self, email: String, password: String) -> AppResult<()>;
    async fn login_with_google(&self) -> AppResult<OAuthRedirect>;
    async fn complete_oauth_sign_in(&self, code: String) -> AppResult<()>;
    async fn logout(&self) -> AppResult<()>;
    async fn register(&self, registration: Registration) -> AppResult<RegistrationOutcome>;
    async fn update_user(&self, patch: UserPatch) -> AppResult<()>;
    async fn refresh_profile(&self) -> AppResult<Option<User>>;
    async fn reset_password(&self, email: String) -> AppResult<OperationStatus>;
    async fn update_password(&self, new_password: String) -> AppResult<OperationStatus>;
}
