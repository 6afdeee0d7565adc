pub mod console_email_sender;
pub mod templates;
