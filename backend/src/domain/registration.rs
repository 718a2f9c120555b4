//! Registration protocol: code issuance and verify-and-register.
//!
//! Two-phase flow per in-flight signup: `Idle → CodeRequested →
//! CodeVerified` (account created); an invalid or expired code returns the
//! flow to `Idle`. Validating the code *before* touching the identity
//! provider avoids orphaned provider accounts on bad codes.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::domain::account::{Account, DisplayName, Email};
use crate::domain::auth::Password;
use crate::domain::error::Error;
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, Clock, ConsumeOutcome, IdentityProvider,
    IdentityProviderError, Mailer, VerificationCodeStore, VerificationCodeStoreError,
};

/// Validated input for the verify-and-register step.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub email: Email,
    pub code: String,
    pub password: Password,
    pub display_name: DisplayName,
}

/// Successful registration: the stored account plus a provider custom
/// sign-in token so the client can establish a session without a second
/// credential prompt.
#[derive(Debug, Clone)]
pub struct RegisteredAccount {
    pub account: Account,
    pub custom_token: String,
}

/// Orchestrates code issuance, code validation, provider account creation,
/// and repository insertion.
#[derive(Clone)]
pub struct RegistrationService {
    accounts: Arc<dyn AccountRepository>,
    codes: Arc<dyn VerificationCodeStore>,
    identity: Arc<dyn IdentityProvider>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
}

impl RegistrationService {
    /// Create a new service over the given collaborators.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        codes: Arc<dyn VerificationCodeStore>,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            codes,
            identity,
            mailer,
            clock,
        }
    }

    /// Issue a verification code and email it to the address.
    ///
    /// Precondition: no provider account exists for the email. A mail
    /// failure is a full request failure; the already-issued code is not
    /// rolled back, so a retry can still succeed.
    pub async fn request_code(&self, email: Email) -> Result<(), Error> {
        let existing = self
            .identity
            .find_account_by_email(&email)
            .await
            .map_err(map_identity_lookup_error)?;
        if existing.is_some() {
            return Err(Error::conflict("User with this email already exists."));
        }

        let issued = self.codes.issue(&email).await.map_err(map_store_error)?;
        self.mailer
            .send_verification_code(&email, &issued.code)
            .await
            .map_err(|error| {
                Error::upstream(format!("failed to send verification code: {error}"))
            })?;
        Ok(())
    }

    /// Complete registration: consume the code, create the provider
    /// account (email pre-verified), insert the local account, and mint a
    /// custom sign-in token.
    ///
    /// Any failure after code validation leaves the code deleted; the
    /// caller must restart from code issuance.
    pub async fn verify_and_register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegisteredAccount, Error> {
        let RegistrationRequest {
            email,
            code,
            password,
            display_name,
        } = request;

        match self
            .codes
            .consume(&email, &code)
            .await
            .map_err(map_store_error)?
        {
            ConsumeOutcome::Consumed => {}
            ConsumeOutcome::NotFound => {
                return Err(
                    Error::invalid_request("Invalid or expired verification code.")
                        .with_details(json!({ "code": "invalid_code" })),
                );
            }
            ConsumeOutcome::Expired => {
                return Err(Error::invalid_request(
                    "Verification code has expired. Please request a new one.",
                )
                .with_details(json!({ "code": "code_expired" })));
            }
        }

        let provider = self
            .identity
            .create_account(crate::domain::ports::NewProviderAccount {
                email: email.clone(),
                password,
                display_name: display_name.clone(),
                // The consumed code already proved ownership.
                email_verified: true,
            })
            .await
            .map_err(map_identity_create_error)?;

        let account = Account::new_linked(
            provider.uid.clone(),
            email,
            display_name,
            self.clock.utc(),
        );
        if let Err(error) = self.accounts.create(&account).await {
            // Compensate so the provider is not left with an account the
            // local store never accepted.
            if let Err(compensation) = self.identity.delete_account(&provider.uid).await {
                warn!(
                    uid = %provider.uid,
                    error = %compensation,
                    "failed to delete provider account after local insert failure"
                );
            }
            return Err(map_repository_error(error));
        }

        let custom_token = self
            .identity
            .issue_custom_token(&provider.uid)
            .await
            .map_err(|error| {
                Error::upstream(format!("failed to issue sign-in token: {error}"))
            })?;

        Ok(RegisteredAccount {
            account,
            custom_token,
        })
    }
}

fn map_store_error(error: VerificationCodeStoreError) -> Error {
    Error::internal(format!("verification code store error: {error}"))
}

fn map_identity_lookup_error(error: IdentityProviderError) -> Error {
    Error::upstream(format!("identity provider lookup failed: {error}"))
}

fn map_identity_create_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::EmailAlreadyInUse => {
            Error::conflict("This email is already registered.")
                .with_details(json!({ "code": "email_already_in_use" }))
        }
        IdentityProviderError::InvalidEmail => {
            Error::invalid_request("Invalid email address format.")
                .with_details(json!({ "field": "email", "code": "invalid_email" }))
        }
        IdentityProviderError::WeakPassword => Error::invalid_request("Password is too weak.")
            .with_details(json!({ "field": "password", "code": "weak_password" })),
        other => Error::upstream(format!("identity provider account creation failed: {other}")),
    }
}

fn map_repository_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::DuplicateKey { .. } => {
            Error::conflict("A user with this email or ID already exists.")
        }
        other => Error::internal(format!("account repository error: {other}")),
    }
}
