#[cfg(any(
    feature = "adapters",
    feature = "axum",
    feature = "sqlx",
    feature = "reqwest"
))]
compile_error!("application must not depend on adapters/framework crates");

pub mod config;
pub mod contracts;
pub mod error;
pub mod infrastructure_config;
pub mod order_tracking;
pub mod ports;
pub mod session;

#[cfg(test)]
pub(crate) mod test_utils;
