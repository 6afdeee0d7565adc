use validator::Validate;

use crate::incoming::http_axum::error_mapper::HttpError;
use storefront_application::error::AppError;

pub fn validated<T: Validate>(request: T) -> Result<T, HttpError> {
    request.validate().map_err(|e| {
        HttpError(AppError::ValidationError {
            message: e.to_string(),
        })
    })?;
    Ok(request)
}
