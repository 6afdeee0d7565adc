use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub profile_store: ProfileStoreConfig,
    pub site: SiteConfig,
    pub oauth: OAuthConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub url: String,
    pub anon_key: SecretString,
    pub request_timeout_secs: u64,
    pub session_file: Option<String>,
}

impl Serialize for ProviderConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ProviderConfig", 4)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("anon_key", "[REDACTED]")?;
        state.serialize_field("request_timeout_secs", &self.request_timeout_secs)?;
        state.serialize_field("session_file", &self.session_file)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ProviderConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ProviderConfigHelper {
            url: String,
            anon_key: String,
            request_timeout_secs: u64,
            #[serde(default)]
            session_file: Option<String>,
        }

        let helper = ProviderConfigHelper::deserialize(deserializer)?;
        Ok(ProviderConfig {
            url: helper.url,
            anon_key: SecretString::from(helper.anon_key),
            request_timeout_secs: helper.request_timeout_secs,
            session_file: helper.session_file,
        })
    }
}

impl ProviderConfig {
    #[must_use]
    pub fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProfileStoreBackend {
    #[serde(rename = "rest")]
    Rest,
    #[serde(rename = "postgres")]
    Postgres,
}

#[derive(Debug, Clone)]
pub struct ProfileStoreConfig {
    pub backend: ProfileStoreBackend,
    pub table: String,
    pub query_timeout_secs: u64,
    pub database_url: SecretString,
    pub pool_size: u32,
}

impl Serialize for ProfileStoreConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ProfileStoreConfig", 5)?;
        state.serialize_field("backend", &self.backend)?;
        state.serialize_field("table", &self.table)?;
        state.serialize_field("query_timeout_secs", &self.query_timeout_secs)?;
        state.serialize_field("database_url", "[REDACTED]")?;
        state.serialize_field("pool_size", &self.pool_size)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ProfileStoreConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ProfileStoreConfigHelper {
            backend: ProfileStoreBackend,
            table: String,
            query_timeout_secs: u64,
            database_url: String,
            pool_size: u32,
        }

        let helper = ProfileStoreConfigHelper::deserialize(deserializer)?;
        Ok(ProfileStoreConfig {
            backend: helper.backend,
            table: helper.table,
            query_timeout_secs: helper.query_timeout_secs,
            database_url: SecretString::from(helper.database_url),
            pool_size: helper.pool_size,
        })
    }
}

impl ProfileStoreConfig {
    #[must_use]
    pub fn redacted_url(&self) -> String {
        let url_str = self.database_url.expose_secret();
        match url::Url::parse(url_str) {
            Ok(mut url) => {
                if url.password().is_some() {
                    url.set_password(Some("***")).ok();
                }
                url.to_string()
            }
            Err(_) => "[INVALID_URL]".to_string(),
        }
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        self.database_url.expose_secret()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub public_origin: String,
    pub reset_password_path: String,
    pub oauth_callback_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub google_enabled: bool,
    pub access_type: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub welcome_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            public_origin: "http://localhost:5173".to_string(),
            reset_password_path: "/reset-password".to_string(),
            oauth_callback_path: "/auth/callback".to_string(),
        }
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            google_enabled: true,
            access_type: "offline".to_string(),
            prompt: "consent".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_origin: None,
            },
            provider: ProviderConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: SecretString::from("public-anon-key"),
                request_timeout_secs: 10,
                session_file: None,
            },
            profile_store: ProfileStoreConfig {
                backend: ProfileStoreBackend::Rest,
                table: "users".to_string(),
                query_timeout_secs: 5,
                database_url: SecretString::from("postgresql://localhost/storefront"),
                pool_size: 5,
            },
            site: SiteConfig::default(),
            oauth: OAuthConfig::default(),
            notifications: NotificationConfig {
                welcome_enabled: true,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: false,
            },
            environment: EnvironmentConfig {
                env: "development".to_string(),
            },
        }
    }
}

impl Config {
    pub fn validate(&self) -> AppResult<()> {
        if url::Url::parse(&self.provider.url).is_err() {
            return Err(AppError::ConfigError {
                message: format!("provider url '{}' is not a valid URL", self.provider.url),
            });
        }

        if self.provider.anon_key.expose_secret().trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "provider anon_key cannot be empty".to_string(),
            });
        }

        if self.provider.request_timeout_secs == 0 {
            return Err(AppError::ConfigError {
                message: "provider request_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.profile_store.table.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "profile_store table cannot be empty".to_string(),
            });
        }

        if self.profile_store.query_timeout_secs == 0 {
            return Err(AppError::ConfigError {
                message: "profile_store query_timeout_secs must be greater than 0".to_string(),
            });
        }

        if matches!(self.profile_store.backend, ProfileStoreBackend::Postgres) {
            if self.profile_store.database_url.expose_secret().is_empty() {
                return Err(AppError::ConfigError {
                    message: "database_url cannot be empty".to_string(),
                });
            }

            if self.profile_store.pool_size == 0 {
                return Err(AppError::ConfigError {
                    message: "profile_store pool_size must be greater than 0".to_string(),
                });
            }
        }

        if url::Url::parse(&self.site.public_origin).is_err() {
            return Err(AppError::ConfigError {
                message: format!(
                    "site public_origin '{}' is not a valid URL",
                    self.site.public_origin
                ),
            });
        }

        for (name, path) in [
            ("reset_password_path", &self.site.reset_password_path),
            ("oauth_callback_path", &self.site.oauth_callback_path),
        ] {
            if !path.starts_with('/') {
                return Err(AppError::ConfigError {
                    message: format!("site {name} must start with '/'"),
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
