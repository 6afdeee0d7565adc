use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

use storefront_application::error::AppError;

pub struct HttpError(pub AppError);

impl HttpError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Domain(_) | AppError::ValidationError { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Persistence { .. } | AppError::ExternalServiceError { .. } => {
                StatusCode::BAD_GATEWAY
            }
            AppError::JsonError(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigError { .. } | AppError::IoError(_) | AppError::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status_code = self.status();

        if status_code.is_server_error() {
            error!("Server error response generated: {}", app_error);
        } else {
            debug!("Client error response generated: {}", app_error);
        }

        // Provider and validation wording is shown to the user as-is.
        let message = match app_error {
            AppError::ConfigError { .. } => "Configuration error".to_string(),
            AppError::IoError(_) | AppError::InternalServerError => {
                "Internal server error".to_string()
            }
            AppError::JsonError(_) => "Invalid JSON format".to_string(),
            _ => app_error.to_string(),
        };

        let error_response = json!({
            "ok": false,
            "error": message,
            "status": status_code.as_u16()
        });

        (status_code, Json(error_response)).into_response()
    }
}

impl From<AppError> for HttpError {
    fn from(app_error: AppError) -> Self {
        HttpError(app_error)
    }
}
