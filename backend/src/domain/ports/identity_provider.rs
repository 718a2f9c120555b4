//! Port abstraction for the external identity provider.
//!
//! The provider owns credential verification and token issuance. The domain
//! only ever sees verified identities and opaque tokens; transport details
//! (REST endpoints, OAuth, signing) live in the outbound adapter.

use async_trait::async_trait;

use crate::domain::account::{DisplayName, Email};
use crate::domain::auth::Password;

/// Failures surfaced by identity provider adapters.
///
/// The registration protocol maps each variant to a distinct client-facing
/// error, so adapters must classify provider responses rather than pass
/// them through raw.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityProviderError {
    /// A provider account already exists for this email.
    #[error("an account already exists for this email")]
    EmailAlreadyInUse,
    /// The provider rejected the email as malformed.
    #[error("email address was rejected by the identity provider")]
    InvalidEmail,
    /// The provider rejected the password as too weak.
    #[error("password was rejected as too weak")]
    WeakPassword,
    /// The presented token has expired.
    #[error("token has expired")]
    TokenExpired,
    /// The presented token failed verification.
    #[error("token is invalid: {message}")]
    InvalidToken { message: String },
    /// No provider account matches the request.
    #[error("no provider account matches the request")]
    AccountNotFound,
    /// Transport failure or unclassified provider error.
    #[error("identity provider request failed: {message}")]
    Upstream { message: String },
}

/// Provider-side view of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAccount {
    pub uid: String,
    pub email: Option<Email>,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

/// Request to create a provider account.
#[derive(Debug, Clone)]
pub struct NewProviderAccount {
    pub email: Email,
    pub password: Password,
    pub display_name: DisplayName,
    /// Set when a verification code already proved email ownership.
    pub email_verified: bool,
}

/// Claims extracted from a successfully verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<Email>,
    pub display_name: Option<String>,
}

/// Driven port for identity verification and token issuance.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up a provider account by email. `Ok(None)` means no account
    /// exists, which is the happy path during registration.
    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<ProviderAccount>, IdentityProviderError>;

    /// Create a provider account.
    async fn create_account(
        &self,
        account: NewProviderAccount,
    ) -> Result<ProviderAccount, IdentityProviderError>;

    /// Delete a provider account. Used as the compensating action when the
    /// local insert fails after provider-side creation succeeded.
    async fn delete_account(&self, uid: &str) -> Result<(), IdentityProviderError>;

    /// Verify a bearer ID token and return the identity it proves.
    async fn verify_id_token(&self, token: &str)
    -> Result<VerifiedIdentity, IdentityProviderError>;

    /// Mint a custom sign-in token for the given subject so a freshly
    /// registered client can establish a session without a second
    /// credential prompt.
    async fn issue_custom_token(&self, uid: &str) -> Result<String, IdentityProviderError>;
}
