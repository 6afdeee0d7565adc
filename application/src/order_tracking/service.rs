use tracing::{info, instrument};

use crate::error::AppResult;
use crate::ports::incoming::order_tracking::OrderTrackingUseCase;
use domain::order_tracking::{OrderTrackingQuery, TrackingInfo};

/// Order lookup backed by a canned result; no order system is consulted.
#[derive(Default)]
pub struct OrderTrackingService;

impl OrderTrackingService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl OrderTrackingUseCase for OrderTrackingService {
    #[instrument(skip(self, query), fields(order_id = %query.order_id))]
    async fn track_order(&self, query: OrderTrackingQuery) -> AppResult<TrackingInfo> {
        query.validate()?;

        info!("Returning mock tracking information");
        Ok(TrackingInfo::mock(query.order_id.trim()))
    }
}
