/// Transactional email collaborator
///
/// The core only needs one message: the password-reset email carrying a
/// reset URL. Delivery (retry, bounce handling) is owned by the provider
/// behind [`Mailer`]; the caller decides whether a send failure is fatal.
///
/// [`HttpMailer`] posts to an HTTP transactional-mail API. [`NoopMailer`]
/// logs instead of sending, for development and tests.

use async_trait::async_trait;
use serde::Serialize;

/// Error type for mail delivery
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// The provider rejected or failed the request
    #[error("Mail delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Sends transactional email
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the password-reset email
    ///
    /// `reset_url` embeds the raw reset token; it must never be logged by
    /// implementations.
    async fn send_password_reset(
        &self,
        recipient: &str,
        name: &str,
        reset_url: &str,
    ) -> Result<(), MailerError>;
}

#[derive(Debug, Serialize)]
struct ResetMailPayload<'a> {
    to: &'a str,
    name: &'a str,
    template: &'static str,
    reset_url: &'a str,
}

/// Mailer posting to an HTTP transactional-mail API
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_password_reset(
        &self,
        recipient: &str,
        name: &str,
        reset_url: &str,
    ) -> Result<(), MailerError> {
        let payload = ResetMailPayload {
            to: recipient,
            name,
            template: "password_reset",
            reset_url,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailerError::DeliveryFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailerError::DeliveryFailed(format!(
                "provider returned {}",
                response.status()
            )));
        }

        tracing::info!(recipient = %recipient, "Password reset email sent");
        Ok(())
    }
}

/// Mailer that logs instead of sending
///
/// Used in development and tests where no provider is configured.
#[derive(Debug, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_password_reset(
        &self,
        recipient: &str,
        _name: &str,
        _reset_url: &str,
    ) -> Result<(), MailerError> {
        tracing::info!(recipient = %recipient, "NoopMailer: password reset email suppressed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_mailer_always_succeeds() {
        let mailer = NoopMailer;
        let result = mailer
            .send_password_reset("user@example.com", "User", "https://example.com/reset?t=x")
            .await;
        assert!(result.is_ok());
    }
}
