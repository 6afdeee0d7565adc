pub mod listener;
pub mod resolver;
pub mod service;
pub mod state;
