//! Lettre-backed SMTP mailer adapter.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::account::Email;
use crate::domain::ports::{Mailer, MailerError};

/// Connection settings for the SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    /// Sender mailbox, e.g. `"Wayfare" <no-reply@wayfare.app>`.
    pub from: String,
    pub timeout: Duration,
}

/// Failures constructing the mailer.
#[derive(Debug, thiserror::Error)]
pub enum SmtpInitError {
    #[error("SMTP relay configuration is invalid: {0}")]
    Relay(#[from] lettre::transport::smtp::Error),
    #[error("sender mailbox is invalid: {0}")]
    Sender(#[from] lettre::address::AddressError),
}

/// Verification-code mailer over an authenticated TLS relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer from relay settings.
    pub fn new(settings: SmtpSettings) -> Result<Self, SmtpInitError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
            .credentials(Credentials::new(settings.username, settings.password))
            .timeout(Some(settings.timeout))
            .build();
        let from: Mailbox = settings.from.parse()?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification_code(&self, to: &Email, code: &str) -> Result<(), MailerError> {
        let recipient: Mailbox =
            to.as_ref()
                .parse()
                .map_err(|error: lettre::address::AddressError| MailerError::Rejected {
                    message: format!("recipient address rejected: {error}"),
                })?;
        let text = format!(
            "Your verification code for Wayfare is: {code}\nThis code is valid for 10 minutes."
        );
        let html = format!(
            "<p>Your verification code for Wayfare is: <strong>{code}</strong></p>\
             <p>This code is valid for 10 minutes.</p>"
        );
        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject("Wayfare Email Verification Code")
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|error| MailerError::Rejected {
                message: format!("failed to build message: {error}"),
            })?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|error| MailerError::Transport {
                message: error.to_string(),
            })
    }
}
