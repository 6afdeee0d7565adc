use axum::{Json, extract::State};

use super::validation::validated;
use crate::incoming::http_axum::{
    dto::{requests::TrackOrderRequest, responses::ApiResponse},
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;
use domain::order_tracking::TrackingInfo;

pub async fn track_order_handler(
    State(state): State<AppState>,
    Json(request): Json<TrackOrderRequest>,
) -> Result<Json<ApiResponse<TrackingInfo>>, HttpError> {
    let request = validated(request)?;

    let info = state
        .order_tracking_use_case
        .track_order(request.into())
        .await?;

    Ok(Json(ApiResponse::success_with_data(Some(info))))
}
