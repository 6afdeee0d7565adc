pub mod error;
pub mod order_tracking;
pub mod session;
pub mod user;
