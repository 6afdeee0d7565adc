use serde::Serialize;

use domain::session::{AuthIdentity, OAuthProvider, Session};
use domain::user::UserId;

/// Auxiliary attributes attached to a password sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpMetadata {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Result of a provider sign-up. `session` is only present when the provider
/// does not require email confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub identity: Option<AuthIdentity>,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSignInRequest {
    pub provider: OAuthProvider,
    pub redirect_to: String,
    pub query_params: Vec<(String, String)>,
}

/// Where the caller must navigate to continue a federated sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OAuthRedirect {
    pub provider: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationStatus {
    pub success: bool,
}

impl OperationStatus {
    pub fn succeeded() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutcome {
    pub user_id: Option<UserId>,
    pub profile_created: bool,
}
