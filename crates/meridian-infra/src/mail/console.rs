//! Console mailer - logs messages instead of sending them.

use async_trait::async_trait;

use meridian_core::ports::{MailError, Mailer, OutboundEmail};

/// Used when no email API key is configured (local development).
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        tracing::info!(
            from = %email.from,
            to = ?email.to,
            reply_to = ?email.reply_to,
            subject = %email.subject,
            "Email not sent (console mailer)\n{}",
            email.text
        );
        Ok(())
    }
}
