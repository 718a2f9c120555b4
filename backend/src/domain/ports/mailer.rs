//! Port abstraction for outbound transactional email.

use async_trait::async_trait;

use crate::domain::account::Email;

/// Failures raised by mail adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailerError {
    /// The relay could not be reached or timed out.
    #[error("mail transport failed: {message}")]
    Transport { message: String },
    /// The relay refused the message.
    #[error("mail was rejected by the relay: {message}")]
    Rejected { message: String },
}

/// Driven port for the outbound mail relay.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver the verification code to the address. Exactly one message per
    /// successful call.
    async fn send_verification_code(&self, to: &Email, code: &str) -> Result<(), MailerError>;
}
