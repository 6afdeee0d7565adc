use crate::error::AppResult;
use domain::order_tracking::{OrderTrackingQuery, TrackingInfo};

#[async_trait::async_trait]
pub trait OrderTrackingUseCase: Send + Sync {
    async fn track_order(&self, query: OrderTrackingQuery) -> AppResult<TrackingInfo>;
}
