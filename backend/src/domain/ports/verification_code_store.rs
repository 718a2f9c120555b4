//! Port abstraction for the one-time verification code store.

use async_trait::async_trait;

use crate::domain::account::Email;
use crate::domain::verification::VerificationCode;

/// Storage errors raised by code store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationCodeStoreError {
    /// Store connection could not be established.
    #[error("verification code store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("verification code store query failed: {message}")]
    Query { message: String },
}

/// Result of presenting an (email, code) pair for consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The pair matched a live code; the record has been deleted and the
    /// code cannot be used again.
    Consumed,
    /// No record matches the pair.
    NotFound,
    /// The pair matched but the code is past its deadline; the record has
    /// been deleted as a side effect.
    Expired,
}

/// Driven port owning verification codes and their expiry.
///
/// Expiry is passive: a record past its deadline is treated as absent on the
/// access that observes it. No sweep is required for correctness.
#[async_trait]
pub trait VerificationCodeStore: Send + Sync {
    /// Generate a fresh 6-digit code valid for ten minutes, replacing any
    /// existing code for the email.
    async fn issue(&self, email: &Email) -> Result<VerificationCode, VerificationCodeStoreError>;

    /// Present an (email, code) pair. A live match is deleted and reported
    /// as [`ConsumeOutcome::Consumed`]; see the outcome variants for the
    /// failure cases.
    async fn consume(
        &self,
        email: &Email,
        code: &str,
    ) -> Result<ConsumeOutcome, VerificationCodeStoreError>;
}
