pub struct EmailTemplate;

impl EmailTemplate {
    pub fn welcome_email_console(recipient_email: &str, first_name: &str, shop_url: &str) -> String {
        let greeting = if first_name.trim().is_empty() {
            "Hi there".to_string()
        } else {
            format!("Hi {first_name}")
        };

        format!(
            r"=== WELCOME EMAIL ===
To: {recipient_email}
Subject: Welcome to the store

{greeting},

Your account has been created. If the store asked you to confirm your
email address, follow the link in the confirmation message first.

Start shopping: {shop_url}

Thanks,
The Store Team
=== END EMAIL ==="
        )
    }
}
