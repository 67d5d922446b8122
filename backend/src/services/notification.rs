//! Notification service for outgoing account and sale emails
//!
//! Account emails are best-effort: a relay failure is logged and swallowed
//! so the write that triggered it still succeeds.

use serde::Deserialize;
use validator::Validate;

use crate::config::MailConfig;
use crate::error::AppResult;
use crate::external::{MailMessage, MailRelayClient};
use crate::models::UserRole;

/// Notification service for sending mail
#[derive(Clone)]
pub struct NotificationService {
    mail_client: Option<MailRelayClient>,
    from_address: String,
}

/// Input for sending a sale email
#[derive(Debug, Deserialize, Validate)]
pub struct SaleEmailInput {
    #[validate(email(message = "Invalid recipient email"))]
    pub to_email: String,
    #[validate(length(min = 1, message = "Subject is required."))]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required."))]
    pub message: String,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(mail_client: Option<MailRelayClient>, config: &MailConfig) -> Self {
        Self {
            mail_client,
            from_address: config.from_address.clone(),
        }
    }

    /// Send a message, surfacing relay failures
    pub async fn send(&self, to: &str, subject: &str, text: &str) -> AppResult<()> {
        let message = MailMessage {
            from: self.from_address.clone(),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            text: text.to_string(),
        };

        match &self.mail_client {
            Some(client) => {
                client.send(&message).await?;
                tracing::info!(to = %to, subject = %subject, "Email sent");
            }
            None => {
                tracing::info!(to = %to, subject = %subject, "Mail relay not configured; email not delivered");
            }
        }

        Ok(())
    }

    /// Send a sale email on behalf of staff
    pub async fn send_sale_email(&self, input: SaleEmailInput) -> AppResult<()> {
        input.validate()?;
        self.send(&input.to_email, &input.subject, &input.message).await
    }

    /// Email a freshly provisioned account its credentials. Never fails.
    pub async fn send_account_credentials(
        &self,
        role: UserRole,
        name: &str,
        email: &str,
        password: &str,
    ) {
        let (subject, body) = account_email(role, name, email, password);
        if let Err(e) = self.send(email, &subject, &body).await {
            tracing::warn!(to = %email, "Failed to send account email: {}", e);
        }
    }
}

/// Subject and body of the credentials email for a new account
fn account_email(role: UserRole, name: &str, email: &str, password: &str) -> (String, String) {
    match role {
        UserRole::Customer => (
            "Your Customer Account Details".to_string(),
            format!(
                "Hello {},\n\nAn account has been created for you.\nEmail: {}\nPassword: {}",
                if name.is_empty() { "Customer" } else { name },
                email,
                password
            ),
        ),
        UserRole::Staff | UserRole::Admin => (
            "Your Staff Account Details".to_string(),
            format!(
                "Hello {},\n\nYour account has been created.\n\nEmail: {}\nPassword: {}",
                if name.is_empty() { "Staff" } else { name },
                email,
                password
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_email_falls_back_to_role_greeting() {
        let (subject, body) = account_email(UserRole::Staff, "", "s@example.com", "pw");
        assert_eq!(subject, "Your Staff Account Details");
        assert!(body.starts_with("Hello Staff,"));
        assert!(body.contains("Password: pw"));
    }

    #[tokio::test]
    async fn unconfigured_relay_only_logs() {
        let service = NotificationService::new(
            None,
            &MailConfig {
                relay_url: None,
                api_key: None,
                from_address: "no-reply@example.com".to_string(),
            },
        );
        assert!(service.send("c@example.com", "Hi", "Body").await.is_ok());
    }
}
