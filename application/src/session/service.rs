use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::SessionSettings;
use crate::contracts::auth::{
    OAuthRedirect, OAuthSignInRequest, OperationStatus, RegistrationOutcome, SignUpMetadata,
};
use crate::contracts::profile::{NewProfile, ProfileChanges, ProfileKey};
use crate::error::{AppError, AppResult};
use crate::ports::incoming::session::{Registration, SessionUseCase};
use crate::ports::outgoing::auth_provider::DynAuthProviderPort;
use crate::ports::outgoing::profile_store::DynProfileStorePort;
use crate::ports::outgoing::welcome_notifier::DynWelcomeNotifierPort;
use crate::session::listener::{SessionEventListener, resolve_into};
use crate::session::resolver::ProfileResolver;
use crate::session::state::{SessionSnapshot, SessionStore};
use domain::session::OAuthProvider;
use domain::user::{User, UserPatch};

const EMAIL_TAKEN: &str = "This email address is already registered. Please use a different email or try logging in.";
const PHONE_TAKEN: &str =
    "This phone number is already registered. Please use a different phone number.";

struct ListenerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct SessionServiceDeps {
    pub auth_provider: DynAuthProviderPort,
    pub profile_store: DynProfileStorePort,
    pub welcome_notifier: Option<DynWelcomeNotifierPort>,
}

pub struct SessionService {
    auth_provider: DynAuthProviderPort,
    profile_store: DynProfileStorePort,
    welcome_notifier: Option<DynWelcomeNotifierPort>,
    resolver: Arc<ProfileResolver>,
    state: SessionStore,
    settings: Arc<SessionSettings>,
    listener: Mutex<Option<ListenerHandle>>,
}

impl SessionService {
    pub fn new(settings: &Arc<SessionSettings>, deps: SessionServiceDeps) -> Self {
        let resolver = Arc::new(ProfileResolver::new(Arc::clone(&deps.profile_store)));
        Self {
            auth_provider: deps.auth_provider,
            profile_store: deps.profile_store,
            welcome_notifier: deps.welcome_notifier,
            resolver,
            state: SessionStore::new(),
            settings: Arc::clone(settings),
            listener: Mutex::new(None),
        }
    }

    /// Restores any existing provider session and starts listening for
    /// session changes. Runs once per service.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> AppResult<()> {
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            return Err(AppError::ValidationError {
                message: "Session service is already initialized".to_string(),
            });
        }

        let events = self.auth_provider.subscribe();

        match self.auth_provider.get_session().await {
            Ok(Some(session)) => {
                info!(user_id = %session.identity.id, "Restoring existing session");
                resolve_into(&self.resolver, &self.state, &session).await;
            }
            Ok(None) => self.state.clear_user(),
            Err(e) => {
                error!("Error fetching initial session: {}", e);
                self.state.clear_user();
            }
        }
        self.state.set_loading(false);

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = SessionEventListener::new(Arc::clone(&self.resolver), self.state.clone())
            .spawn(events, shutdown_rx);
        *listener = Some(ListenerHandle { shutdown, task });

        Ok(())
    }

    /// Stops the event listener. Later calls are no-ops.
    pub async fn shutdown(&self) {
        let Some(handle) = self.listener.lock().await.take() else {
            return;
        };

        if handle.shutdown.send(true).is_err() {
            warn!("Session event listener already stopped");
        }
        if let Err(e) = handle.task.await {
            error!("Session event listener task failed: {}", e);
        }
    }

    async fn ensure_unique(&self, key: ProfileKey<'_>, message: &str) -> AppResult<()> {
        if self.profile_store.find_one(key).await?.is_some() {
            return Err(AppError::Conflict {
                message: message.to_string(),
            });
        }
        Ok(())
    }

    async fn notify_registered(&self, email: &str, first_name: &str) {
        let Some(notifier) = &self.welcome_notifier else {
            return;
        };
        if let Err(e) = notifier.notify_registered(email, first_name).await {
            warn!(recipient = email, "Welcome notification failed: {}", e);
        }
    }

    async fn register_inner(&self, registration: Registration) -> AppResult<RegistrationOutcome> {
        let Registration {
            first_name,
            last_name,
            email,
            phone,
            password,
        } = registration;

        self.ensure_unique(ProfileKey::Email(&email), EMAIL_TAKEN)
            .await?;
        if !phone.is_empty() {
            self.ensure_unique(ProfileKey::Phone(&phone), PHONE_TAKEN)
                .await?;
        }

        let outcome = self
            .auth_provider
            .sign_up(
                &email,
                &password,
                SignUpMetadata {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    phone: phone.clone(),
                },
            )
            .await?;

        let Some(identity) = outcome.identity else {
            return Ok(RegistrationOutcome {
                user_id: None,
                profile_created: false,
            });
        };

        let profile = NewProfile {
            id: identity.id,
            first_name: first_name.clone(),
            last_name,
            email: email.clone(),
            phone: Some(phone).filter(|phone| !phone.is_empty()),
        };

        // The auth identity already exists at this point; a missing profile
        // row is recreated on the next sign-in.
        let profile_created = match self.profile_store.insert(profile).await {
            Ok(_) => true,
            Err(e) => {
                error!(user_id = %identity.id, "Profile creation error: {}", e);
                false
            }
        };

        self.notify_registered(&email, &first_name).await;

        Ok(RegistrationOutcome {
            user_id: Some(identity.id),
            profile_created,
        })
    }
}

#[async_trait::async_trait]
impl SessionUseCase for SessionService {
    fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: String, password: String) -> AppResult<()> {
        let _loading = self.state.loading();
        self.state.clear_user();

        let session = self
            .auth_provider
            .sign_in_with_password(&email, &password)
            .await
            .map_err(|e| {
                error!("Login error: {}", e);
                e.into_authentication("Login failed")
            })?;

        self.state.begin_resolution();
        resolve_into(&self.resolver, &self.state, &session).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn login_with_google(&self) -> AppResult<OAuthRedirect> {
        self.state.clear_user();

        if !self.settings.google_enabled {
            return Err(AppError::Authentication {
                message: "Google login is not enabled".to_string(),
            });
        }

        self.auth_provider
            .sign_in_with_oauth(OAuthSignInRequest {
                provider: OAuthProvider::Google,
                redirect_to: self.settings.oauth_redirect.clone(),
                query_params: self.settings.google_query_params.clone(),
            })
            .await
            .map_err(|e| {
                error!("Google login error: {}", e);
                e.into_authentication("Google login failed")
            })
    }

    #[instrument(skip(self, code))]
    async fn complete_oauth_sign_in(&self, code: String) -> AppResult<()> {
        let _loading = self.state.loading();
        self.state.clear_user();

        let session = self
            .auth_provider
            .exchange_code_for_session(&code)
            .await
            .map_err(|e| {
                error!("OAuth callback error: {}", e);
                e.into_authentication("Google login failed")
            })?;

        self.state.begin_resolution();
        resolve_into(&self.resolver, &self.state, &session).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> AppResult<()> {
        self.auth_provider.sign_out().await.map_err(|e| {
            error!("Logout error: {}", e);
            e.into_authentication("Logout failed")
        })?;

        self.state.clear_user();
        Ok(())
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    async fn register(&self, registration: Registration) -> AppResult<RegistrationOutcome> {
        let _loading = self.state.loading();

        self.register_inner(registration).await.map_err(|e| {
            error!("Registration error: {}", e);
            match e {
                AppError::Conflict { .. } | AppError::Persistence { .. } => e,
                other => other.into_authentication("Registration failed"),
            }
        })
    }

    #[instrument(skip(self, patch))]
    async fn update_user(&self, patch: UserPatch) -> AppResult<()> {
        let Some(user) = self.state.current_user() else {
            return Ok(());
        };

        let patch = patch.without_blanks();
        let changes = ProfileChanges::from(&patch);
        if changes.is_empty() {
            return Ok(());
        }

        self.profile_store
            .update(&user.id, &changes)
            .await
            .map_err(|e| {
                error!(user_id = %user.id, "Update user error: {}", e);
                match e {
                    AppError::Conflict { .. } | AppError::Persistence { .. } => e,
                    other => AppError::Persistence {
                        message: other.to_string(),
                    },
                }
            })?;

        // Local copy is merged rather than re-read; `refresh_profile` reloads
        // the stored row. Skipped if another user signed in meanwhile.
        if !self.state.merge_user(&user.id, &patch) {
            debug!(
                user_id = %user.id,
                "Current user changed during update, local merge skipped"
            );
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn refresh_profile(&self) -> AppResult<Option<User>> {
        let Some(session) = self.auth_provider.get_session().await? else {
            return Ok(None);
        };

        let _loading = self.state.loading();
        match self.resolver.resolve(&session.identity).await {
            Ok(user) => {
                self.state.set_user(user.clone());
                Ok(Some(user))
            }
            Err(e) => {
                error!(user_id = %session.identity.id, "Error refreshing profile: {}", e);
                self.state.mark_degraded(e.to_string());
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn reset_password(&self, email: String) -> AppResult<OperationStatus> {
        self.auth_provider
            .send_password_reset(&email, &self.settings.reset_password_redirect)
            .await
            .map_err(|e| {
                error!("Password reset error: {}", e);
                e.into_authentication("Password reset failed")
            })?;

        Ok(OperationStatus::succeeded())
    }

    #[instrument(skip(self, new_password))]
    async fn update_password(&self, new_password: String) -> AppResult<OperationStatus> {
        self.auth_provider
            .set_password(&new_password)
            .await
            .map_err(|e| {
                error!("Password update error: {}", e);
                e.into_authentication("Password update failed")
            })?;

        Ok(OperationStatus::succeeded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::SessionStatus;
    use crate::test_utils::{
        FakeAuthProvider, FakeProfileStore, RecordingNotifier, identity_with, profile_for,
    };
    use domain::session::{AuthEvent, IdentityMetadata, Session};
    use domain::user::UserId;
    use uuid::Uuid;

    struct Harness {
        service: SessionService,
        provider: Arc<FakeAuthProvider>,
        store: Arc<FakeProfileStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness() -> Harness {
        let provider = Arc::new(FakeAuthProvider::default());
        let store = Arc::new(FakeProfileStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = SessionService::new(
            &Arc::new(SessionSettings::default()),
            SessionServiceDeps {
                auth_provider: provider.clone(),
                profile_store: store.clone(),
                welcome_notifier: Some(notifier.clone()),
            },
        );
        Harness {
            service,
            provider,
            store,
            notifier,
        }
    }

    fn registration(email: &str, phone: &str) -> Registration {
        Registration {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password: "correct horse battery staple".to_string(),
        }
    }

    async fn signed_in(h: &Harness) -> User {
        let identity = identity_with(IdentityMetadata::default());
        h.store.seed(profile_for(&identity, "Jane", "Doe")).await;
        h.provider.accept_password(Session::new(identity)).await;
        h.service
            .login("jane@example.com".to_string(), "pw".to_string())
            .await
            .unwrap();
        h.service.snapshot().user.unwrap()
    }

    #[tokio::test]
    async fn initialize_without_session_is_anonymous_and_not_loading() {
        let h = harness();

        h.service.initialize().await.unwrap();

        let snapshot = h.service.snapshot();
        assert_eq!(snapshot.user, None);
        assert_eq!(snapshot.status, SessionStatus::Anonymous);
        assert!(!snapshot.is_loading);
        h.service.shutdown().await;
    }

    #[tokio::test]
    async fn initialize_restores_existing_session() {
        let h = harness();
        let identity = identity_with(IdentityMetadata::default());
        h.store.seed(profile_for(&identity, "Jane", "Doe")).await;
        h.provider.set_session(Some(Session::new(identity))).await;

        h.service.initialize().await.unwrap();

        assert_eq!(h.service.snapshot().user.unwrap().first_name, "Jane");
        h.service.shutdown().await;
    }

    #[tokio::test]
    async fn initialize_twice_is_rejected() {
        let h = harness();
        h.service.initialize().await.unwrap();

        assert!(matches!(
            h.service.initialize().await,
            Err(AppError::ValidationError { .. })
        ));
        h.service.shutdown().await;
        h.service.shutdown().await;
    }

    #[tokio::test]
    async fn provider_events_reach_state_after_initialize() {
        let h = harness();
        h.service.initialize().await.unwrap();
        let identity = identity_with(IdentityMetadata {
            full_name: Some("Jane Doe Smith".to_string()),
            ..IdentityMetadata::default()
        });
        let mut rx = h.service.subscribe();

        h.provider.emit(AuthEvent::signed_in(Session::new(identity)));
        let snapshot = rx
            .wait_for(|snapshot| snapshot.status == SessionStatus::Authenticated)
            .await
            .unwrap()
            .clone();

        let user = snapshot.user.unwrap();
        assert_eq!(user.first_name, "Jane");
        assert_eq!(user.last_name, "Doe Smith");

        h.provider.emit(AuthEvent::signed_out());
        rx.wait_for(|snapshot| snapshot.user.is_none())
            .await
            .unwrap();
        h.service.shutdown().await;
    }

    #[tokio::test]
    async fn login_clears_user_before_resolution() {
        let h = harness();
        let first = signed_in(&h).await;
        h.store.observe(h.service.state.clone()).await;

        let second = identity_with(IdentityMetadata::default());
        h.store.seed(profile_for(&second, "John", "Roe")).await;
        h.provider.accept_password(Session::new(second)).await;
        h.service
            .login("john@example.com".to_string(), "pw".to_string())
            .await
            .unwrap();

        assert_eq!(h.store.users_seen_during_lookup().await, vec![None]);
        let current = h.service.snapshot().user.unwrap();
        assert_ne!(current.id, first.id);
        assert_eq!(current.first_name, "John");
    }

    #[tokio::test]
    async fn failed_login_surfaces_provider_message() {
        let h = harness();
        h.provider.reject_password("Invalid credentials").await;

        let err = h
            .service
            .login("a@x.com".to_string(), "bad".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Authentication { .. }));
        assert_eq!(err.to_string(), "Invalid credentials");
        let snapshot = h.service.snapshot();
        assert_eq!(snapshot.user, None);
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn failed_login_without_message_uses_fallback() {
        let h = harness();
        h.provider.reject_password("").await;

        let err = h
            .service
            .login("a@x.com".to_string(), "bad".to_string())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Login failed");
    }

    #[tokio::test]
    async fn login_with_failing_profile_store_is_degraded() {
        let h = harness();
        h.store.fail_lookups().await;
        h.provider
            .accept_password(Session::new(identity_with(IdentityMetadata::default())))
            .await;

        h.service
            .login("jane@example.com".to_string(), "pw".to_string())
            .await
            .unwrap();

        let snapshot = h.service.snapshot();
        assert_eq!(snapshot.user, None);
        assert!(matches!(snapshot.status, SessionStatus::Degraded { .. }));
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn google_login_requests_offline_consent_redirect_to_root() {
        let h = harness();
        signed_in(&h).await;

        let redirect = h.service.login_with_google().await.unwrap();

        assert_eq!(redirect.provider, "google");
        let request = h.provider.last_oauth_request().await.unwrap();
        assert_eq!(request.provider, OAuthProvider::Google);
        assert_eq!(request.redirect_to, "http://localhost:5173/");
        assert!(
            request
                .query_params
                .contains(&("access_type".to_string(), "offline".to_string()))
        );
        assert!(
            request
                .query_params
                .contains(&("prompt".to_string(), "consent".to_string()))
        );
        assert_eq!(h.service.snapshot().user, None);
    }

    #[tokio::test]
    async fn oauth_callback_resolves_federated_profile() {
        let h = harness();
        let identity = identity_with(IdentityMetadata {
            full_name: Some("Jane Doe Smith".to_string()),
            ..IdentityMetadata::default()
        });
        h.provider.accept_code(Session::new(identity)).await;

        h.service
            .complete_oauth_sign_in("code-123".to_string())
            .await
            .unwrap();

        let user = h.service.snapshot().user.unwrap();
        assert_eq!(user.first_name, "Jane");
        assert_eq!(user.last_name, "Doe Smith");
    }

    #[tokio::test]
    async fn logout_clears_user() {
        let h = harness();
        signed_in(&h).await;

        h.service.logout().await.unwrap();

        assert_eq!(h.service.snapshot().status, SessionStatus::Anonymous);
        assert_eq!(h.service.snapshot().user, None);
    }

    #[tokio::test]
    async fn failed_logout_keeps_user() {
        let h = harness();
        let user = signed_in(&h).await;
        h.provider.fail_sign_out("network down").await;

        let err = h.service.logout().await.unwrap_err();

        assert_eq!(err.to_string(), "network down");
        assert_eq!(h.service.snapshot().user, Some(user));
    }

    #[tokio::test]
    async fn register_with_taken_email_skips_provider() {
        let h = harness();
        let existing = identity_with(IdentityMetadata::default());
        let mut record = profile_for(&existing, "Jane", "Doe");
        record.email = "taken@example.com".to_string();
        h.store.seed(record).await;

        let err = h
            .service
            .register(registration("taken@example.com", "5550100"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.to_string(), EMAIL_TAKEN);
        assert_eq!(h.provider.sign_up_calls().await, 0);
        assert!(!h.service.snapshot().is_loading);
    }

    #[tokio::test]
    async fn register_with_taken_phone_is_conflict() {
        let h = harness();
        let existing = identity_with(IdentityMetadata::default());
        let mut record = profile_for(&existing, "Jane", "Doe");
        record.phone = Some("5550100".to_string());
        h.store.seed(record).await;

        let err = h
            .service
            .register(registration("new@example.com", "5550100"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), PHONE_TAKEN);
        assert_eq!(h.provider.sign_up_calls().await, 0);
    }

    #[tokio::test]
    async fn register_creates_profile_and_notifies() {
        let h = harness();

        let outcome = h
            .service
            .register(registration("new@example.com", "5550100"))
            .await
            .unwrap();

        assert!(outcome.profile_created);
        let inserted = h.store.inserted().await;
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].email, "new@example.com");
        assert_eq!(inserted[0].phone.as_deref(), Some("5550100"));
        let metadata = h.provider.last_sign_up_metadata().await.unwrap();
        assert_eq!(metadata.first_name, "Jane");
        assert_eq!(metadata.phone, "5550100");
        assert_eq!(h.notifier.recipients().await, vec!["new@example.com"]);
    }

    #[tokio::test]
    async fn register_tolerates_profile_insert_failure() {
        let h = harness();
        h.store.fail_inserts().await;

        let outcome = h
            .service
            .register(registration("new@example.com", "5550100"))
            .await
            .unwrap();

        assert!(outcome.user_id.is_some());
        assert!(!outcome.profile_created);
        assert_eq!(h.provider.sign_up_calls().await, 1);
    }

    #[tokio::test]
    async fn register_surfaces_provider_rejection() {
        let h = harness();
        h.provider.reject_sign_up("Password should be at least 6 characters").await;

        let err = h
            .service
            .register(registration("new@example.com", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Authentication { .. }));
        assert_eq!(err.to_string(), "Password should be at least 6 characters");
        assert!(h.store.inserted().await.is_empty());
    }

    #[tokio::test]
    async fn register_with_empty_phone_skips_phone_check() {
        let h = harness();
        let existing = identity_with(IdentityMetadata::default());
        let mut record = profile_for(&existing, "Jane", "Doe");
        record.phone = Some(String::new());
        h.store.seed(record).await;

        let outcome = h
            .service
            .register(registration("new@example.com", ""))
            .await
            .unwrap();

        assert!(outcome.profile_created);
        assert_eq!(h.store.inserted().await[0].phone, None);
    }

    #[tokio::test]
    async fn update_user_without_current_user_is_noop() {
        let h = harness();

        h.service
            .update_user(UserPatch {
                phone: Some("9999999999".to_string()),
                ..UserPatch::default()
            })
            .await
            .unwrap();

        assert!(h.store.updates().await.is_empty());
    }

    #[tokio::test]
    async fn update_user_merges_only_provided_fields() {
        let h = harness();
        let before = signed_in(&h).await;

        h.service
            .update_user(UserPatch {
                phone: Some("9999999999".to_string()),
                ..UserPatch::default()
            })
            .await
            .unwrap();

        let after = h.service.snapshot().user.unwrap();
        assert_eq!(after.phone.as_deref(), Some("9999999999"));
        assert_eq!(after.first_name, before.first_name);
        assert_eq!(after.last_name, before.last_name);
        assert_eq!(after.email, before.email);
        assert_eq!(after.date_of_birth, before.date_of_birth);

        let updates = h.store.updates().await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, before.id);
        assert_eq!(updates[0].1.columns(), vec![("phone", "9999999999")]);
    }

    #[tokio::test]
    async fn update_user_drops_blank_fields() {
        let h = harness();
        let before = signed_in(&h).await;

        h.service
            .update_user(UserPatch {
                first_name: Some(String::new()),
                phone: Some(String::new()),
                last_name: Some("Roe".to_string()),
                ..UserPatch::default()
            })
            .await
            .unwrap();

        let after = h.service.snapshot().user.unwrap();
        assert_eq!(after.first_name, before.first_name);
        assert_eq!(after.phone, None);
        assert_eq!(after.last_name, "Roe");

        let updates = h.store.updates().await;
        assert_eq!(updates[0].1.columns(), vec![("last_name", "Roe")]);
    }

    #[tokio::test]
    async fn update_user_with_only_blank_fields_is_noop() {
        let h = harness();
        let before = signed_in(&h).await;

        h.service
            .update_user(UserPatch {
                email: Some(" ".to_string()),
                ..UserPatch::default()
            })
            .await
            .unwrap();

        assert!(h.store.updates().await.is_empty());
        assert_eq!(h.service.snapshot().user, Some(before));
    }

    #[tokio::test]
    async fn update_user_does_not_leak_into_user_signed_in_meanwhile() {
        let h = harness();
        let alice = signed_in(&h).await;
        let bob = User {
            id: UserId::from_uuid(Uuid::new_v4()),
            first_name: "Bob".to_string(),
            ..alice.clone()
        };
        h.store
            .switch_user_during_update(h.service.state.clone(), bob.clone())
            .await;

        h.service
            .update_user(UserPatch {
                first_name: Some("Alicia".to_string()),
                ..UserPatch::default()
            })
            .await
            .unwrap();

        let updates = h.store.updates().await;
        assert_eq!(updates[0].0, alice.id);
        assert_eq!(h.service.snapshot().user, Some(bob));
    }

    #[tokio::test]
    async fn update_user_failure_keeps_previous_user() {
        let h = harness();
        let before = signed_in(&h).await;
        h.store.fail_updates().await;

        let err = h
            .service
            .update_user(UserPatch {
                first_name: Some("Janet".to_string()),
                ..UserPatch::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Persistence { .. }));
        assert_eq!(h.service.snapshot().user, Some(before));
    }

    #[tokio::test]
    async fn refresh_profile_reloads_stored_row() {
        let h = harness();
        let user = signed_in(&h).await;
        h.provider
            .set_session(Some(Session::new(identity_with_id(&user))))
            .await;
        h.store
            .rename(&user.id, "Janet")
            .await;

        let refreshed = h.service.refresh_profile().await.unwrap().unwrap();

        assert_eq!(refreshed.first_name, "Janet");
        assert_eq!(h.service.snapshot().user.unwrap().first_name, "Janet");
    }

    #[tokio::test]
    async fn refresh_profile_without_session_is_none() {
        let h = harness();
        assert_eq!(h.service.refresh_profile().await.unwrap(), None);
    }

    #[tokio::test]
    async fn reset_password_targets_reset_path() {
        let h = harness();

        let status = h
            .service
            .reset_password("jane@example.com".to_string())
            .await
            .unwrap();

        assert!(status.success);
        assert_eq!(
            h.provider.last_reset_redirect().await.as_deref(),
            Some("http://localhost:5173/reset-password")
        );
    }

    #[tokio::test]
    async fn update_password_failure_is_authentication_error() {
        let h = harness();
        h.provider.fail_set_password("Auth session missing!").await;

        let err = h
            .service
            .update_password("new-secret".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Authentication { .. }));
        assert_eq!(err.to_string(), "Auth session missing!");
    }

    fn identity_with_id(user: &User) -> domain::session::AuthIdentity {
        let mut identity = identity_with(IdentityMetadata::default());
        identity.id = user.id;
        identity
    }
}
