use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

use crate::contracts::auth::{
    OAuthRedirect, OAuthSignInRequest, SignUpMetadata, SignUpOutcome,
};
use crate::contracts::profile::{NewProfile, ProfileChanges, ProfileKey, ProfileRecord};
use crate::error::{AppError, AppResult};
use crate::ports::outgoing::auth_provider::{AuthEventReceiver, AuthProviderPort};
use crate::ports::outgoing::profile_store::ProfileStorePort;
use crate::ports::outgoing::welcome_notifier::WelcomeNotifierPort;
use crate::session::state::SessionStore;
use domain::session::{AuthEvent, AuthIdentity, IdentityMetadata, Session};
use domain::user::{User, UserId};

pub fn identity_with(metadata: IdentityMetadata) -> AuthIdentity {
    AuthIdentity {
        id: UserId::from_uuid(Uuid::new_v4()),
        email: Some("jane@example.com".to_string()),
        metadata,
    }
}

pub fn profile_for(identity: &AuthIdentity, first_name: &str, last_name: &str) -> ProfileRecord {
    ProfileRecord {
        id: identity.id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: identity.email.clone().unwrap_or_default(),
        phone: None,
        date_of_birth: None,
    }
}

fn auth_error(message: &str) -> AppError {
    AppError::Authentication {
        message: message.to_string(),
    }
}

#[derive(Default)]
struct ProfileStoreState {
    records: Vec<ProfileRecord>,
    inserted: Vec<NewProfile>,
    updates: Vec<(UserId, ProfileChanges)>,
    fail_lookups: bool,
    fail_inserts: bool,
    fail_updates: bool,
    racing_insert: Option<ProfileRecord>,
    switch_on_update: Option<(SessionStore, User)>,
    observed: Option<SessionStore>,
    seen_during_lookup: Vec<Option<User>>,
}

#[derive(Default)]
pub struct FakeProfileStore {
    state: Mutex<ProfileStoreState>,
}

impl FakeProfileStore {
    pub async fn seed(&self, record: ProfileRecord) {
        self.state.lock().await.records.push(record);
    }

    pub async fn inserted(&self) -> Vec<NewProfile> {
        self.state.lock().await.inserted.clone()
    }

    pub async fn updates(&self) -> Vec<(UserId, ProfileChanges)> {
        self.state.lock().await.updates.clone()
    }

    pub async fn fail_lookups(&self) {
        self.state.lock().await.fail_lookups = true;
    }

    pub async fn fail_inserts(&self) {
        self.state.lock().await.fail_inserts = true;
    }

    pub async fn fail_updates(&self) {
        self.state.lock().await.fail_updates = true;
    }

    /// Makes the next insert lose a race: `winner` lands first and the insert
    /// reports a conflict.
    pub async fn lose_insert_race(&self, winner: ProfileRecord) {
        self.state.lock().await.racing_insert = Some(winner);
    }

    /// Signs `user` into `store` while the next update is in flight.
    pub async fn switch_user_during_update(&self, store: SessionStore, user: User) {
        self.state.lock().await.switch_on_update = Some((store, user));
    }

    pub async fn rename(&self, id: &UserId, first_name: &str) {
        let mut state = self.state.lock().await;
        if let Some(record) = state.records.iter_mut().find(|record| record.id == *id) {
            record.first_name = first_name.to_string();
        }
    }

    /// Records the user visible in `store` each time a lookup runs.
    pub async fn observe(&self, store: SessionStore) {
        self.state.lock().await.observed = Some(store);
    }

    pub async fn users_seen_during_lookup(&self) -> Vec<Option<User>> {
        self.state.lock().await.seen_during_lookup.clone()
    }
}

#[async_trait::async_trait]
impl ProfileStorePort for FakeProfileStore {
    async fn find_one(&self, key: ProfileKey<'_>) -> AppResult<Option<ProfileRecord>> {
        let mut state = self.state.lock().await;
        if let Some(seen) = state.observed.as_ref().map(SessionStore::current_user) {
            state.seen_during_lookup.push(seen);
        }
        if state.fail_lookups {
            return Err(AppError::Persistence {
                message: "lookup failed".to_string(),
            });
        }

        let found = state.records.iter().find(|record| match key {
            ProfileKey::Id(id) => record.id == *id,
            ProfileKey::Email(email) => record.email == email,
            ProfileKey::Phone(phone) => record.phone.as_deref() == Some(phone),
        });
        Ok(found.cloned())
    }

    async fn insert(&self, profile: NewProfile) -> AppResult<ProfileRecord> {
        let mut state = self.state.lock().await;
        if state.fail_inserts {
            return Err(AppError::Persistence {
                message: "insert failed".to_string(),
            });
        }
        if let Some(winner) = state.racing_insert.take() {
            state.records.push(winner);
            return Err(AppError::Conflict {
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }

        let record = ProfileRecord {
            id: profile.id,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            date_of_birth: None,
        };
        state.inserted.push(profile);
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &UserId, changes: &ProfileChanges) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.fail_updates {
            return Err(AppError::Persistence {
                message: "update failed".to_string(),
            });
        }
        if let Some((store, user)) = state.switch_on_update.take() {
            store.set_user(user);
        }
        state.updates.push((*id, changes.clone()));
        Ok(())
    }
}

struct AuthProviderState {
    session: Option<Session>,
    password_result: AppResult<Session>,
    code_result: AppResult<Session>,
    sign_up_error: Option<String>,
    sign_out_error: Option<String>,
    set_password_error: Option<String>,
    sign_up_calls: usize,
    last_sign_up_metadata: Option<SignUpMetadata>,
    last_oauth_request: Option<OAuthSignInRequest>,
    last_reset_redirect: Option<String>,
}

impl Default for AuthProviderState {
    fn default() -> Self {
        Self {
            session: None,
            password_result: Err(auth_error("Invalid login credentials")),
            code_result: Err(auth_error("invalid flow state, no valid flow state found")),
            sign_up_error: None,
            sign_out_error: None,
            set_password_error: None,
            sign_up_calls: 0,
            last_sign_up_metadata: None,
            last_oauth_request: None,
            last_reset_redirect: None,
        }
    }
}

pub struct FakeAuthProvider {
    events: broadcast::Sender<AuthEvent>,
    state: Mutex<AuthProviderState>,
}

impl Default for FakeAuthProvider {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            events,
            state: Mutex::new(AuthProviderState::default()),
        }
    }
}

impl FakeAuthProvider {
    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    pub async fn set_session(&self, session: Option<Session>) {
        self.state.lock().await.session = session;
    }

    pub async fn accept_password(&self, session: Session) {
        self.state.lock().await.password_result = Ok(session);
    }

    pub async fn reject_password(&self, message: &str) {
        self.state.lock().await.password_result = Err(auth_error(message));
    }

    pub async fn accept_code(&self, session: Session) {
        self.state.lock().await.code_result = Ok(session);
    }

    pub async fn reject_sign_up(&self, message: &str) {
        self.state.lock().await.sign_up_error = Some(message.to_string());
    }

    pub async fn fail_sign_out(&self, message: &str) {
        self.state.lock().await.sign_out_error = Some(message.to_string());
    }

    pub async fn fail_set_password(&self, message: &str) {
        self.state.lock().await.set_password_error = Some(message.to_string());
    }

    pub async fn sign_up_calls(&self) -> usize {
        self.state.lock().await.sign_up_calls
    }

    pub async fn last_sign_up_metadata(&self) -> Option<SignUpMetadata> {
        self.state.lock().await.last_sign_up_metadata.clone()
    }

    pub async fn last_oauth_request(&self) -> Option<OAuthSignInRequest> {
        self.state.lock().await.last_oauth_request.clone()
    }

    pub async fn last_reset_redirect(&self) -> Option<String> {
        self.state.lock().await.last_reset_redirect.clone()
    }
}

#[async_trait::async_trait]
impl AuthProviderPort for FakeAuthProvider {
    async fn get_session(&self) -> AppResult<Option<Session>> {
        Ok(self.state.lock().await.session.clone())
    }

    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> AppResult<Session> {
        match &self.state.lock().await.password_result {
            Ok(session) => Ok(session.clone()),
            Err(e) => Err(auth_error(&e.to_string())),
        }
    }

    async fn sign_in_with_oauth(&self, request: OAuthSignInRequest) -> AppResult<OAuthRedirect> {
        let url = format!(
            "http://localhost:54321/auth/v1/authorize?provider={}",
            request.provider.as_str()
        );
        let provider = request.provider.as_str();
        self.state.lock().await.last_oauth_request = Some(request);
        Ok(OAuthRedirect { provider, url })
    }

    async fn exchange_code_for_session(&self, _code: &str) -> AppResult<Session> {
        match &self.state.lock().await.code_result {
            Ok(session) => Ok(session.clone()),
            Err(e) => Err(auth_error(&e.to_string())),
        }
    }

    async fn sign_out(&self) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(message) = &state.sign_out_error {
            return Err(auth_error(message));
        }
        state.session = None;
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        metadata: SignUpMetadata,
    ) -> AppResult<SignUpOutcome> {
        let mut state = self.state.lock().await;
        state.sign_up_calls += 1;
        if let Some(message) = &state.sign_up_error {
            return Err(auth_error(message));
        }

        let identity = AuthIdentity {
            id: UserId::from_uuid(Uuid::new_v4()),
            email: Some(email.to_string()),
            metadata: IdentityMetadata {
                first_name: Some(metadata.first_name.clone()),
                last_name: Some(metadata.last_name.clone()),
                phone: Some(metadata.phone.clone()),
                full_name: None,
            },
        };
        state.last_sign_up_metadata = Some(metadata);
        Ok(SignUpOutcome {
            identity: Some(identity),
            session: None,
        })
    }

    async fn send_password_reset(&self, _email: &str, redirect_to: &str) -> AppResult<()> {
        self.state.lock().await.last_reset_redirect = Some(redirect_to.to_string());
        Ok(())
    }

    async fn set_password(&self, _new_password: &str) -> AppResult<()> {
        match &self.state.lock().await.set_password_error {
            Some(message) => Err(auth_error(message)),
            None => Ok(()),
        }
    }

    fn subscribe(&self) -> AuthEventReceiver {
        self.events.subscribe()
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    recipients: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub async fn recipients(&self) -> Vec<String> {
        self.recipients.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl WelcomeNotifierPort for RecordingNotifier {
    async fn notify_registered(&self, recipient_email: &str, _first_name: &str) -> AppResult<()> {
        self.recipients
            .lock()
            .await
            .push(recipient_email.to_string());
        Ok(())
    }
}
