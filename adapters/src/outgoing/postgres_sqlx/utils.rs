use std::{future::Future, time::Duration};

use storefront_application::error::{AppError, AppResult};
use tokio::time::timeout;
use tracing::debug;

const UNIQUE_VIOLATION: &str = "23505";

pub struct PostgresExecutor {
    timeout_secs: u64,
}

impl PostgresExecutor {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    pub async fn execute_with_timeout<T, F, Fut>(
        &self,
        operation: F,
        error_context: &str,
    ) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        timeout(Duration::from_secs(self.timeout_secs), operation())
            .await
            .map_err(|_| AppError::Persistence {
                message: "DB timeout".to_string(),
            })?
            .map_err(|e| map_sqlx_error(&e, error_context))
    }
}

/// Unique-constraint violations become `Conflict`; everything else is a
/// persistence failure.
pub fn map_sqlx_error(error: &sqlx::Error, context: &str) -> AppError {
    match error {
        sqlx::Error::Database(db_error) if db_error.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            debug!(
                constraint = db_error.constraint().unwrap_or("unknown"),
                "{}: unique constraint violated", context
            );
            AppError::Conflict {
                message: "A profile with this email address or phone number already exists."
                    .to_string(),
            }
        }
        _ => AppError::Persistence {
            message: format!("{}: {}", context, error),
        },
    }
}

/// Rejects anything but a plain SQL identifier, since table names are
/// interpolated into statements.
pub fn validate_identifier(identifier: &str) -> AppResult<&str> {
    let valid = !identifier.is_empty()
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !identifier.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(identifier)
    } else {
        Err(AppError::ConfigError {
            message: format!("Invalid table name: {identifier}"),
        })
    }
}
