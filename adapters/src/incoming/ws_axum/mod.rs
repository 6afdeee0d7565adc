pub(crate) mod connection;

pub mod endpoint;
pub mod protocol;
