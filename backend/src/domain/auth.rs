//! Credential primitives for registration and the legacy login path.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a service.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::account::Email;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    EmptyPassword,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Plaintext password held only for the duration of a request.
///
/// The backing string is zeroed on drop. Strength policy is deliberately not
/// enforced here: the identity provider is the authority on weak passwords
/// and surfaces them as a distinct failure.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

impl Password {
    /// Construct a password, rejecting empty input.
    pub fn new(raw: impl Into<String>) -> Result<Self, CredentialValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Expose the plaintext for hashing or forwarding to the provider.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated email/password pair used by the legacy direct login path.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: Email,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn new(email: Email, password: Password) -> Self {
        Self { email, password }
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password to verify against the stored hash.
    pub fn password(&self) -> &Password {
        &self.password
    }
}
