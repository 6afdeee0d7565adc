use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use storefront_application::{
    infrastructure_config::Config,
    ports::incoming::{order_tracking::OrderTrackingUseCase, session::SessionUseCase},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session_use_case: Arc<dyn SessionUseCase>,
    pub order_tracking_use_case: Arc<dyn OrderTrackingUseCase>,
    pub active_websocket_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        session_use_case: Arc<dyn SessionUseCase>,
        order_tracking_use_case: Arc<dyn OrderTrackingUseCase>,
    ) -> Self {
        Self {
            config,
            session_use_case,
            order_tracking_use_case,
            active_websocket_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn increment_websocket_connections(&self) -> usize {
        self.active_websocket_connections
            .fetch_add(1, Ordering::Relaxed)
            + 1
    }

    pub fn decrement_websocket_connections(&self) -> usize {
        self.active_websocket_connections
            .fetch_sub(1, Ordering::Relaxed)
            .saturating_sub(1)
    }

    pub fn get_websocket_connection_count(&self) -> usize {
        self.active_websocket_connections.load(Ordering::Relaxed)
    }
}
