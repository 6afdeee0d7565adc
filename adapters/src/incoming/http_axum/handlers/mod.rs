pub(crate) mod validation;

pub mod health;
pub mod orders;
pub mod session;
