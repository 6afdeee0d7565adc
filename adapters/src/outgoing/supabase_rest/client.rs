use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use storefront_application::{
    error::{AppError, AppResult},
    infrastructure_config::ProviderConfig,
};

const AUTH_PREFIX: &str = "auth/v1";
const REST_PREFIX: &str = "rest/v1";

/// Error payload shapes returned by GoTrue and PostgREST.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub code: Option<Value>,
    pub msg: Option<String>,
    pub message: Option<String>,
    pub error_description: Option<String>,
    pub error: Option<String>,
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Most specific human-readable message in the payload.
    pub fn message(&self) -> Option<&str> {
        [
            &self.msg,
            &self.message,
            &self.error_description,
            &self.error,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|message| !message.trim().is_empty())
    }

    /// Error code as a string; GoTrue sends numbers, PostgREST strings.
    pub fn code(&self) -> Option<String> {
        match self.code.as_ref()? {
            Value::String(code) => Some(code.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A failed response: status plus the decoded error payload.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiFailure {
    pub fn message_or_status(&self) -> String {
        self.body.message().map_or_else(
            || {
                self.status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            },
            ToString::to_string,
        )
    }
}

/// Shared HTTP plumbing for the hosted auth and REST endpoints.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
}

impl SupabaseClient {
    pub fn new(config: &ProviderConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::ConfigError {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            anon_key: SecretString::from(config.anon_key()),
        })
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/{AUTH_PREFIX}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/{REST_PREFIX}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request carrying the project key, authorized as `bearer` when given
    /// and as the anonymous role otherwise.
    pub fn request(&self, method: Method, url: &str, bearer: Option<&str>) -> RequestBuilder {
        let anon_key = self.anon_key.expose_secret();
        self.http
            .request(method, url)
            .header("apikey", anon_key)
            .bearer_auth(bearer.unwrap_or(anon_key))
    }

    pub async fn send(&self, request: RequestBuilder) -> AppResult<Result<Response, ApiFailure>> {
        let response = request.send().await.map_err(|e| {
            warn!("Auth backend request failed: {}", e);
            AppError::ExternalServiceError {
                message: if e.is_timeout() {
                    "Auth backend request timed out".to_string()
                } else {
                    format!("Auth backend unreachable: {e}")
                },
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(Ok(response));
        }

        let body = response.text().await.unwrap_or_default();
        Ok(Err(ApiFailure {
            status,
            body: ErrorBody::parse(&body),
        }))
    }

    pub async fn json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::ExternalServiceError {
                message: format!("Unexpected auth backend response: {e}"),
            })
    }
}
