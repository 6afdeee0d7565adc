use std::sync::Arc;

use tokio::sync::broadcast;

use crate::contracts::auth::{OAuthRedirect, OAuthSignInRequest, SignUpMetadata, SignUpOutcome};
use crate::error::AppResult;
use domain::session::{AuthEvent, Session};

pub type AuthEventReceiver = broadcast::Receiver<AuthEvent>;

/// Hosted authentication service. Rejections are reported as
/// `AppError::Authentication` carrying the provider's own message.
#[async_trait::async_trait]
pub trait AuthProviderPort: Send + Sync {
    async fn get_session(&self) -> AppResult<Option<Session>>;
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session>;
    async fn sign_in_with_oauth(&self, request: OAuthSignInRequest) -> AppResult<OAuthRedirect>;
    async fn exchange_code_for_session(&self, code: &str) -> AppResult<Session>;
    async fn sign_out(&self) -> AppResult<()>;
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> AppResult<SignUpOutcome>;
    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> AppResult<()>;
    async fn set_password(&self, new_password: &str) -> AppResult<()>;
    fn subscribe(&self) -> AuthEventReceiver;
}

pub type DynAuthProviderPort = Arc<dyn AuthProviderPort>;
