use tracing::info;

use storefront_application::infrastructure_config::{Config, ProfileStoreBackend};

pub fn print_startup_info(config: &Config) {
    let base_url = format!("http://{}", config.server_address());
    info!("Session endpoints:");
    info!("  Snapshot: {}/session", base_url);
    info!("  Live feed: {}/session/live", base_url);
    info!(
        "  OAuth callback: {}{}",
        base_url, config.site.oauth_callback_path
    );

    info!("Configuration:");
    info!("  Auth provider: {}", config.provider.base_url());
    match config.profile_store.backend {
        ProfileStoreBackend::Rest => info!(
            "  Profile store: REST table '{}'",
            config.profile_store.table
        ),
        ProfileStoreBackend::Postgres => info!(
            "  Profile store: Postgres table '{}' at {}",
            config.profile_store.table,
            config.profile_store.redacted_url()
        ),
    }
    info!(
        "  Google sign-in: {}",
        if config.oauth.google_enabled {
            "ENABLED"
        } else {
            "DISABLED"
        }
    );
    info!(
        "  Session file: {}",
        config
            .provider
            .session_file
            .as_deref()
            .unwrap_or("in-memory only")
    );
}
