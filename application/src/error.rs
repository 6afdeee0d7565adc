use std::io;
use thiserror::Error;

use domain::error::DomainError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{message}")]
    Authentication { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("External service error: {message}")]
    ExternalServiceError { message: String },

    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    /// Message to hand back to the caller of a provider-backed operation:
    /// the provider's own wording when it gave one, `fallback` otherwise.
    pub fn into_authentication(self, fallback: &str) -> Self {
        match self {
            Self::Authentication { message } if !message.trim().is_empty() => {
                Self::Authentication { message }
            }
            Self::Conflict { message } => Self::Conflict { message },
            _ => Self::Authentication {
                message: fallback.to_string(),
            },
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
