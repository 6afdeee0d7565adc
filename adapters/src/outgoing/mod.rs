pub mod email_sender;
pub mod events_broadcast;
pub mod postgres_sqlx;
pub mod supabase_rest;
