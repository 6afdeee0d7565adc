pub mod client;
pub mod gotrue;
pub mod postgrest;
pub mod session_cache;
