use crate::error::{AppError, AppResult};
use crate::infrastructure_config::Config;

/// Redirect targets and federated-login parameters the session service hands
/// to the auth provider.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub oauth_redirect: String,
    pub reset_password_redirect: String,
    pub google_enabled: bool,
    pub google_query_params: Vec<(String, String)>,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let origin = url::Url::parse(&config.site.public_origin).map_err(|e| {
            AppError::ConfigError {
                message: format!("Invalid public origin: {e}"),
            }
        })?;

        let oauth_redirect = origin.join("/").map_err(|e| AppError::ConfigError {
            message: format!("Invalid OAuth redirect: {e}"),
        })?;

        let reset_password_redirect =
            origin
                .join(&config.site.reset_password_path)
                .map_err(|e| AppError::ConfigError {
                    message: format!("Invalid reset-password redirect: {e}"),
                })?;

        Ok(Self {
            oauth_redirect: oauth_redirect.to_string(),
            reset_password_redirect: reset_password_redirect.to_string(),
            google_enabled: config.oauth.google_enabled,
            google_query_params: vec![
                ("access_type".to_string(), config.oauth.access_type.clone()),
                ("prompt".to_string(), config.oauth.prompt.clone()),
            ],
        })
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            oauth_redirect: "http://localhost:5173/".to_string(),
            reset_password_redirect: "http://localhost:5173/reset-password".to_string(),
            google_enabled: true,
            google_query_params: vec![
                ("access_type".to_string(), "offline".to_string()),
                ("prompt".to_string(), "consent".to_string()),
            ],
        }
    }
}
