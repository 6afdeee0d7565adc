use super::templates::EmailTemplate;
use storefront_application::{
    error::AppResult, ports::outgoing::welcome_notifier::WelcomeNotifierPort,
};
use tracing::{info, instrument};

/// Writes welcome messages to the log instead of sending them.
pub struct ConsoleWelcomeNotifier {
    shop_url: String,
}

impl ConsoleWelcomeNotifier {
    pub fn new(shop_url: String) -> Self {
        Self { shop_url }
    }
}

#[async_trait::async_trait]
impl WelcomeNotifierPort for ConsoleWelcomeNotifier {
    #[instrument(skip(self))]
    async fn notify_registered(&self, recipient_email: &str, first_name: &str) -> AppResult<()> {
        let email_content =
            EmailTemplate::welcome_email_console(recipient_email, first_name, &self.shop_url);

        info!(
            recipient = recipient_email,
            "Welcome email (console notifier)"
        );
        info!("{}", email_content);

        Ok(())
    }
}
