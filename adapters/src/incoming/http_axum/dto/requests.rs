use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};
use validator::{Validate, ValidationError};

use domain::{order_tracking::OrderTrackingQuery, user::UserPatch};
use storefront_application::ports::incoming::session::Registration;

fn validate_date_of_birth(value: &str) -> Result<(), ValidationError> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map(|_| ())
        .map_err(|_| {
            let mut error = ValidationError::new("date_of_birth");
            error.message = Some("Date of birth must be formatted as YYYY-MM-DD".into());
            error
        })
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Optional; an empty string means no phone number.
    #[serde(default)]
    pub phone: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            password: request.password,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_date_of_birth"))]
    pub date_of_birth: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            date_of_birth: request.date_of_birth,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackOrderRequest {
    #[validate(length(min = 1, message = "Order ID is required"))]
    pub order_id: String,

    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

impl From<TrackOrderRequest> for OrderTrackingQuery {
    fn from(request: TrackOrderRequest) -> Self {
        Self {
            order_id: request.order_id,
            email: request.email,
        }
    }
}

/// Query string the provider appends when redirecting back after a
/// federated sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}
