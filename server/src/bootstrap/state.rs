use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use storefront_adapters::outgoing::{
    email_sender::console_email_sender::ConsoleWelcomeNotifier,
    postgres_sqlx::profile_store_postgres::PostgresProfileStore,
    supabase_rest::{
        client::SupabaseClient, gotrue::GoTrueAuthProvider, postgrest::PostgrestProfileStore,
        session_cache::SessionCache,
    },
};
use storefront_adapters::shared::app_state::AppState as AdaptersAppState;
use storefront_application::{
    config::SessionSettings,
    error::AppError,
    infrastructure_config::{Config, ProfileStoreBackend},
    order_tracking::service::OrderTrackingService,
    ports::incoming::{order_tracking::OrderTrackingUseCase, session::SessionUseCase},
    ports::outgoing::{
        auth_provider::DynAuthProviderPort, profile_store::DynProfileStorePort,
        welcome_notifier::DynWelcomeNotifierPort,
    },
    session::service::{SessionService, SessionServiceDeps},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session_service: Arc<SessionService>,
    pub order_tracking_service: Arc<OrderTrackingService>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);

        let client = Arc::new(SupabaseClient::new(&config.provider)?);
        let cache = Arc::new(
            SessionCache::load(config.provider.session_file.as_ref().map(PathBuf::from)).await,
        );

        let auth_provider: DynAuthProviderPort = Arc::new(GoTrueAuthProvider::new(
            Arc::clone(&client),
            Arc::clone(&cache),
        ));
        let profile_store = Self::create_profile_store(&config, &client, &cache).await?;
        let welcome_notifier = Self::create_welcome_notifier(&config);

        let settings = Arc::new(SessionSettings::from_config(&config)?);
        let session_service = Arc::new(SessionService::new(
            &settings,
            SessionServiceDeps {
                auth_provider,
                profile_store,
                welcome_notifier,
            },
        ));

        Ok(Self {
            config,
            session_service,
            order_tracking_service: Arc::new(OrderTrackingService::new()),
        })
    }

    async fn create_profile_store(
        config: &Config,
        client: &Arc<SupabaseClient>,
        cache: &Arc<SessionCache>,
    ) -> Result<DynProfileStorePort, AppError> {
        match config.profile_store.backend {
            ProfileStoreBackend::Rest => Ok(Arc::new(PostgrestProfileStore::new(
                Arc::clone(client),
                Arc::clone(cache),
                config.profile_store.table.clone(),
            ))),
            ProfileStoreBackend::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.profile_store.pool_size)
                    .connect(config.profile_store.database_url())
                    .await
                    .map_err(|e| AppError::Persistence {
                        message: format!("Failed to connect to database: {}", e),
                    })?;

                sqlx::migrate!("../migrations")
                    .run(&pool)
                    .await
                    .map_err(|e| AppError::Persistence {
                        message: format!("Failed to run migrations: {}", e),
                    })?;
                info!("Database migrations applied");

                Ok(Arc::new(PostgresProfileStore::new(
                    pool,
                    &config.profile_store.table,
                    config.profile_store.query_timeout_secs,
                )?))
            }
        }
    }

    fn create_welcome_notifier(config: &Config) -> Option<DynWelcomeNotifierPort> {
        if !config.notifications.welcome_enabled {
            return None;
        }
        Some(Arc::new(ConsoleWelcomeNotifier::new(
            config.site.public_origin.clone(),
        )))
    }

    pub fn to_adapters_state(&self) -> AdaptersAppState {
        AdaptersAppState::new(
            Arc::clone(&self.config),
            Arc::clone(&self.session_service) as Arc<dyn SessionUseCase>,
            Arc::clone(&self.order_tracking_service) as Arc<dyn OrderTrackingUseCase>,
        )
    }
}
