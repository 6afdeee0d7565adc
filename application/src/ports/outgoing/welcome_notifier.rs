use std::sync::Arc;

use crate::error::AppResult;

#[async_trait::async_trait]
pub trait WelcomeNotifierPort: Send + Sync {
    async fn notify_registered(&self, recipient_email: &str, first_name: &str) -> AppResult<()>;
}

pub type DynWelcomeNotifierPort = Arc<dyn WelcomeNotifierPort>;
