//! Transactional email over an HTTP JSON API.

use std::time::Duration;

use async_trait::async_trait;

use meridian_core::ports::{MailError, Mailer, OutboundEmail};

/// Longest provider error body kept in a [`MailError::Rejected`].
const MAX_ERROR_BODY: usize = 512;

/// HTTP mailer configuration.
#[derive(Debug, Clone)]
pub struct HttpMailConfig {
    /// Endpoint accepting `POST` of an [`OutboundEmail`] as JSON.
    pub api_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Sends mail through a provider API authenticated with a bearer key.
pub struct HttpMailer {
    client: reqwest::Client,
    config: HttpMailConfig,
}

impl HttpMailer {
    pub fn new(config: HttpMailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
            .json(email)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(subject = %email.subject, "Email accepted by provider");
            return Ok(());
        }

        let mut message = response.text().await.unwrap_or_default();
        if message.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| message.is_char_boundary(*i))
                .unwrap_or(0);
            message.truncate(cut);
        }

        Err(MailError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
