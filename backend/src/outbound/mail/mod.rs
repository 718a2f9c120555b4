//! Outbound mail adapters.

mod smtp;

pub use smtp::{SmtpInitError, SmtpMailer, SmtpSettings};
