pub mod auth_provider;
pub mod profile_store;
pub mod welcome_notifier;
