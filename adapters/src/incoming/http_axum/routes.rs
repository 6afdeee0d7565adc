use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::incoming::{
    http_axum::{
        handlers::{
            health::health_check,
            orders::track_order_handler,
            session::{
                get_session, google_login_handler, login_handler, logout_handler,
                oauth_callback_handler, refresh_profile_handler, register_handler,
                reset_password_handler, update_password_handler, update_user_handler,
            },
        },
        router_ext::RouterExt,
    },
    ws_axum::endpoint::session_live_handler,
};
use crate::shared::app_state::AppState;
use storefront_application::infrastructure_config::Config;

pub fn build_application_router(config: &Config) -> Router<AppState> {
    build_core_routes()
        .merge(build_session_routes(config))
        .merge(build_order_routes())
}

fn build_core_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

fn build_session_routes(config: &Config) -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/live", get(session_live_handler))
        .route("/session/login", post(login_handler))
        .route("/session/google", post(google_login_handler))
        .route("/session/logout", post(logout_handler))
        .route("/session/register", post(register_handler))
        .route("/session/user", patch(update_user_handler))
        .route("/session/refresh", post(refresh_profile_handler))
        .route("/session/password/reset", post(reset_password_handler))
        .route("/session/password", put(update_password_handler))
        .route(&config.site.oauth_callback_path, get(oauth_callback_handler))
        .with_request_id()
}

fn build_order_routes() -> Router<AppState> {
    Router::new().route("/orders/track", post(track_order_handler))
}
