//! Transactional email port.

use async_trait::async_trait;
use serde::Serialize;

/// A plain-text email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

/// Email delivery backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

/// Delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Provider rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport failed: {0}")]
    Transport(String),
}
