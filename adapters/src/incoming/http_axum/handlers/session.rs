use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use tracing::{info, warn};

use super::validation::validated;
use crate::incoming::http_axum::{
    dto::{
        requests::{
            LoginRequest, OAuthCallbackQuery, RegisterRequest, ResetPasswordRequest,
            UpdatePasswordRequest, UpdateUserRequest,
        },
        responses::{ApiResponse, SessionResponse},
    },
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;
use domain::user::User;
use storefront_application::{
    contracts::auth::{OAuthRedirect, OperationStatus, RegistrationOutcome},
    error::AppError,
};

type SessionJson = Json<ApiResponse<SessionResponse>>;

fn session_json(state: &AppState) -> SessionJson {
    Json(ApiResponse::success_with_data(Some(
        state.session_use_case.snapshot().into(),
    )))
}

pub async fn get_session(State(state): State<AppState>) -> SessionJson {
    session_json(&state)
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<SessionJson, HttpError> {
    let request = validated(request)?;

    state
        .session_use_case
        .login(request.email, request.password)
        .await?;

    Ok(session_json(&state))
}

pub async fn google_login_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OAuthRedirect>>, HttpError> {
    let redirect = state.session_use_case.login_with_google().await?;
    Ok(Json(ApiResponse::success_with_data(Some(redirect))))
}

/// Lands the browser back on the storefront once the provider code has been
/// exchanged for a session.
pub async fn oauth_callback_handler(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Redirect, HttpError> {
    if let Some(error) = query.error {
        warn!(error = %error, "OAuth provider returned an error");
        return Err(HttpError(AppError::Authentication {
            message: query.error_description.unwrap_or(error),
        }));
    }

    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| {
            HttpError(AppError::Authentication {
                message: "Missing authorization code".to_string(),
            })
        })?;

    state.session_use_case.complete_oauth_sign_in(code).await?;
    info!("OAuth sign-in completed");

    let home = format!(
        "{}/",
        state.config.site.public_origin.trim_end_matches('/')
    );
    Ok(Redirect::to(&home))
}

pub async fn logout_handler(State(state): State<AppState>) -> Result<SessionJson, HttpError> {
    state.session_use_case.logout().await?;
    Ok(session_json(&state))
}

pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let request = validated(request)?;

    let outcome = state.session_use_case.register(request.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::<RegistrationOutcome>::success_with_data(Some(
            outcome,
        ))),
    ))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<SessionJson, HttpError> {
    let request = validated(request)?;

    state.session_use_case.update_user(request.into()).await?;

    Ok(session_json(&state))
}

pub async fn refresh_profile_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<User>>, HttpError> {
    let user = state.session_use_case.refresh_profile().await?;
    Ok(Json(ApiResponse::success_with_data(user)))
}

pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<OperationStatus>>, HttpError> {
    let request = validated(request)?;

    let status = state.session_use_case.reset_password(request.email).await?;

    Ok(Json(ApiResponse::success_with_data(Some(status))))
}

pub async fn update_password_handler(
    State(state): State<AppState>,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<OperationStatus>>, HttpError> {
    let request = validated(request)?;

    let status = state
        .session_use_case
        .update_password(request.password)
        .await?;

    Ok(Json(ApiResponse::success_with_data(Some(status))))
}
