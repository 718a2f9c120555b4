//! Port abstraction for account persistence adapters and their errors.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::account::{Account, AccountId, Email};

/// Field on which a uniqueness constraint was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Email,
    ProviderId,
}

impl std::fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::ProviderId => f.write_str("provider id"),
        }
    }
}

/// Persistence errors raised by account repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountRepositoryError {
    /// Repository connection could not be established.
    #[error("account repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("account repository query failed: {message}")]
    Query { message: String },
    /// A unique key (email or provider id) already exists.
    #[error("an account already exists with this {field}")]
    DuplicateKey { field: DuplicateField },
}

/// Driven port owning all `Account` records.
///
/// Every mutation is an independent load-modify-store cycle; the port
/// deliberately exposes no cross-record transaction (see DESIGN.md on the
/// inherited two-record write contract).
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account. Fails with [`AccountRepositoryError::DuplicateKey`]
    /// when the email or provider id is already taken.
    async fn create(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Persist the current state of an existing account.
    async fn save(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Fetch an account by local identifier.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch an account by (lowercased) email.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch an account by identity-provider subject id.
    async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<Account>, AccountRepositoryError>;

    /// List accounts whose ids are not in `exclude` (swipe-deck query).
    async fn list_excluding(
        &self,
        exclude: &BTreeSet<AccountId>,
    ) -> Result<Vec<Account>, AccountRepositoryError>;
}
