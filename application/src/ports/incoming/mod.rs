pub mod order_tracking;
pub mod session;
