use std::sync::Arc;

use oauth2::{PkceCodeChallenge, PkceCodeVerifier};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::client::{ApiFailure, SupabaseClient};
use super::session_cache::{GoTrueUser, SessionCache, StoredSession};
use crate::outgoing::events_broadcast::tokio_broadcast::TokioBroadcastAuthEvents;
use domain::session::{AuthEvent, AuthEventKind, Session};
use storefront_application::{
    contracts::auth::{OAuthRedirect, OAuthSignInRequest, SignUpMetadata, SignUpOutcome},
    error::{AppError, AppResult},
    ports::outgoing::auth_provider::{AuthEventReceiver, AuthProviderPort},
};

const PKCE_METHOD: &str = "s256";
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: GoTrueUser,
}

impl TokenResponse {
    fn into_stored(self, now: OffsetDateTime) -> StoredSession {
        let now = now.unix_timestamp();
        let expires_at = self.expires_at.unwrap_or_else(|| {
            now + self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
        });

        StoredSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Sign-up answers with a session when auto-confirm is on and with the bare
/// user when email confirmation is pending.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(GoTrueUser),
}

fn auth_failure(failure: &ApiFailure) -> AppError {
    let message = failure.message_or_status();
    if failure.status.is_server_error() {
        warn!(status = %failure.status, "Auth backend error: {}", message);
        return AppError::ExternalServiceError { message };
    }
    debug!(status = %failure.status, "Auth backend rejected request: {}", message);
    AppError::Authentication { message }
}

/// [`AuthProviderPort`] over the GoTrue REST API.
pub struct GoTrueAuthProvider {
    client: Arc<SupabaseClient>,
    cache: Arc<SessionCache>,
    events: TokioBroadcastAuthEvents,
    pkce_verifier: Mutex<Option<PkceCodeVerifier>>,
}

impl GoTrueAuthProvider {
    pub fn new(client: Arc<SupabaseClient>, cache: Arc<SessionCache>) -> Self {
        Self {
            client,
            cache,
            events: TokioBroadcastAuthEvents::default(),
            pkce_verifier: Mutex::new(None),
        }
    }

    async fn grant(&self, grant_type: &str, body: serde_json::Value) -> AppResult<StoredSession> {
        let request = self
            .client
            .request(Method::POST, &self.client.auth_url("token"), None)
            .query(&[("grant_type", grant_type)])
            .json(&body);

        let response = self
            .client
            .send(request)
            .await?
            .map_err(|failure| auth_failure(&failure))?;
        let token: TokenResponse = SupabaseClient::json(response).await?;

        Ok(token.into_stored(OffsetDateTime::now_utc()))
    }

    async fn establish(&self, stored: StoredSession, kind: AuthEventKind) -> AppResult<Session> {
        let session = stored.to_session();
        self.cache.store(stored).await?;
        self.events
            .publish(AuthEvent::with_session(kind, session.clone()));
        Ok(session)
    }

    async fn refresh(&self, stored: StoredSession) -> AppResult<Option<Session>> {
        let refreshed = self
            .grant(
                "refresh_token",
                json!({ "refresh_token": stored.refresh_token }),
            )
            .await;

        match refreshed {
            Ok(refreshed) => {
                debug!(user_id = %refreshed.user.id, "Session refreshed");
                self.establish(refreshed, AuthEventKind::TokenRefreshed)
                    .await
                    .map(Some)
            }
            Err(AppError::Authentication { message }) => {
                warn!(user_id = %stored.user.id, "Session refresh rejected: {}", message);
                self.cache.clear().await;
                self.events.publish(AuthEvent::signed_out());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl AuthProviderPort for GoTrueAuthProvider {
    #[instrument(skip(self))]
    async fn get_session(&self) -> AppResult<Option<Session>> {
        let Some(stored) = self.cache.get().await else {
            return Ok(None);
        };

        if stored.needs_refresh(OffsetDateTime::now_utc()) {
            return self.refresh(stored).await;
        }

        Ok(Some(stored.to_session()))
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        let stored = self
            .grant("password", json!({ "email": email, "password": password }))
            .await?;

        info!(user_id = %stored.user.id, "Password sign-in succeeded");
        self.establish(stored, AuthEventKind::SignedIn).await
    }

    #[instrument(skip(self, request), fields(provider = request.provider.as_str()))]
    async fn sign_in_with_oauth(&self, request: OAuthSignInRequest) -> AppResult<OAuthRedirect> {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();

        let mut url =
            Url::parse(&self.client.auth_url("authorize")).map_err(|e| AppError::ConfigError {
                message: format!("Invalid auth backend URL: {e}"),
            })?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("provider", request.provider.as_str())
                .append_pair("redirect_to", &request.redirect_to)
                .append_pair("code_challenge", challenge.as_str())
                .append_pair("code_challenge_method", PKCE_METHOD);
            for (name, value) in &request.query_params {
                query.append_pair(name, value);
            }
        }

        *self.pkce_verifier.lock().await = Some(verifier);

        Ok(OAuthRedirect {
            provider: request.provider.as_str(),
            url: url.into(),
        })
    }

    #[instrument(skip(self, code))]
    async fn exchange_code_for_session(&self, code: &str) -> AppResult<Session> {
        let verifier =
            self.pkce_verifier
                .lock()
                .await
                .take()
                .ok_or_else(|| AppError::Authentication {
                    message: "No OAuth sign-in is in progress".to_string(),
                })?;

        let stored = self
            .grant(
                "pkce",
                json!({ "auth_code": code, "code_verifier": verifier.secret() }),
            )
            .await?;

        info!(user_id = %stored.user.id, "OAuth sign-in completed");
        self.establish(stored, AuthEventKind::SignedIn).await
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> AppResult<()> {
        if let Some(token) = self.cache.access_token().await {
            let request = self
                .client
                .request(Method::POST, &self.client.auth_url("logout"), Some(&token));

            match self.client.send(request).await? {
                Ok(_) => {}
                Err(failure)
                    if matches!(failure.status, StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND) =>
                {
                    debug!("Session was already invalid on the auth backend");
                }
                Err(failure) => return Err(auth_failure(&failure)),
            }
        }

        self.cache.clear().await;
        self.events.publish(AuthEvent::signed_out());
        Ok(())
    }

    #[instrument(skip(self, password, metadata))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> AppResult<SignUpOutcome> {
        let request = self
            .client
            .request(Method::POST, &self.client.auth_url("signup"), None)
            .json(&json!({ "email": email, "password": password, "data": metadata }));

        let response = self
            .client
            .send(request)
            .await?
            .map_err(|failure| auth_failure(&failure))?;

        match SupabaseClient::json::<SignUpResponse>(response).await? {
            SignUpResponse::Session(token) => {
                let stored = token.into_stored(OffsetDateTime::now_utc());
                let identity = stored.user.identity();
                let session = self.establish(stored, AuthEventKind::SignedIn).await?;
                Ok(SignUpOutcome {
                    identity: Some(identity),
                    session: Some(session),
                })
            }
            SignUpResponse::User(user) => {
                info!(user_id = %user.id, "Sign-up awaiting email confirmation");
                Ok(SignUpOutcome {
                    identity: Some(user.identity()),
                    session: None,
                })
            }
        }
    }

    #[instrument(skip(self))]
    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> AppResult<()> {
        let request = self
            .client
            .request(Method::POST, &self.client.auth_url("recover"), None)
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }));

        self.client
            .send(request)
            .await?
            .map_err(|failure| auth_failure(&failure))?;
        Ok(())
    }

    #[instrument(skip(self, new_password))]
    async fn set_password(&self, new_password: &str) -> AppResult<()> {
        let Some(mut stored) = self.cache.get().await else {
            return Err(AppError::Authentication {
                message: "Auth session missing!".to_string(),
            });
        };

        let request = self
            .client
            .request(
                Method::PUT,
                &self.client.auth_url("user"),
                Some(&stored.access_token),
            )
            .json(&json!({ "password": new_password }));

        let response = self
            .client
            .send(request)
            .await?
            .map_err(|failure| auth_failure(&failure))?;
        stored.user = SupabaseClient::json(response).await?;

        self.establish(stored, AuthEventKind::UserUpdated).await?;
        Ok(())
    }

    fn subscribe(&self) -> AuthEventReceiver {
        self.events.subscribe()
    }
}
