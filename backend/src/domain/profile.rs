//! Profile directory: identity sync, profile reads/updates, and the legacy
//! direct registration/login path.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::domain::account::{Account, AccountId, DisplayName, Email, TravelType};
use crate::domain::auth::{LoginCredentials, Password};
use crate::domain::error::Error;
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, Clock, VerifiedIdentity,
};

/// Display name used when the provider token carries none.
const FALLBACK_DISPLAY_NAME: &str = "Anonymous User";

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<DisplayName>,
    pub bio: Option<String>,
    pub travel_type: Option<TravelType>,
    /// `Some("")` clears the picture; any other value replaces the URL.
    pub profile_picture: Option<String>,
}

/// Account reads and writes that do not touch the social graph.
#[derive(Clone)]
pub struct ProfileService {
    accounts: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    /// Create a new service over the given collaborators.
    pub fn new(accounts: Arc<dyn AccountRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { accounts, clock }
    }

    /// Find-or-create the local account for a verified provider identity.
    ///
    /// Resolution order: provider subject id, then email (which links the
    /// subject id onto the existing account), then a fresh account built
    /// from the token claims. Name/email drift from the provider is copied
    /// onto an existing account.
    pub async fn sync_identity(&self, identity: VerifiedIdentity) -> Result<Account, Error> {
        if let Some(mut account) = self
            .accounts
            .find_by_provider_id(&identity.uid)
            .await
            .map_err(map_repository_error)?
        {
            if self.refresh_claims(&mut account, &identity) {
                self.save(&mut account).await?;
            }
            return Ok(account);
        }

        let Some(email) = identity.email.clone() else {
            return Err(Error::invalid_request(
                "Token does not carry an email address.",
            ));
        };

        if let Some(mut account) = self
            .accounts
            .find_by_email(&email)
            .await
            .map_err(map_repository_error)?
        {
            account.provider_id = Some(identity.uid.clone());
            self.refresh_claims(&mut account, &identity);
            self.save(&mut account).await?;
            return Ok(account);
        }

        let display_name = identity
            .display_name
            .as_deref()
            .and_then(|name| DisplayName::new(name).ok())
            .unwrap_or_else(|| {
                DisplayName::new(FALLBACK_DISPLAY_NAME)
                    .unwrap_or_else(|err| panic!("fallback display name must be valid: {err}"))
            });
        let account =
            Account::new_linked(identity.uid.clone(), email, display_name, self.clock.utc());
        match self.accounts.create(&account).await {
            Ok(()) => Ok(account),
            Err(AccountRepositoryError::DuplicateKey { .. }) => Err(Error::conflict(
                "A user with this email already exists. Please log in or use a different email.",
            )),
            Err(other) => Err(map_repository_error(other)),
        }
    }

    /// Fetch a profile by account id.
    pub async fn profile(&self, id: AccountId) -> Result<Account, Error> {
        self.accounts
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    /// Apply a partial profile update and return the stored account.
    pub async fn update_profile(
        &self,
        id: AccountId,
        update: ProfileUpdate,
    ) -> Result<Account, Error> {
        let mut account = self.profile(id).await?;
        if let Some(display_name) = update.display_name {
            account.display_name = display_name;
        }
        if let Some(bio) = update.bio {
            account.bio = bio;
        }
        if let Some(travel_type) = update.travel_type {
            account.travel_type = travel_type;
        }
        if let Some(picture) = update.profile_picture {
            // An empty string clears the picture; upload itself happens on
            // the external media host.
            account.profile_picture = picture;
        }
        self.save(&mut account).await?;
        Ok(account)
    }

    /// Legacy direct registration: local-only account with a hashed
    /// password and no provider linkage.
    pub async fn register_direct(
        &self,
        email: Email,
        password: Password,
        display_name: DisplayName,
    ) -> Result<Account, Error> {
        if self
            .accounts
            .find_by_email(&email)
            .await
            .map_err(map_repository_error)?
            .is_some()
        {
            return Err(Error::conflict("User already exists"));
        }

        let mut account = Account::new(email, display_name, self.clock.utc());
        account.password_hash = Some(hash_password(&password)?);
        match self.accounts.create(&account).await {
            Ok(()) => Ok(account),
            Err(AccountRepositoryError::DuplicateKey { .. }) => {
                Err(Error::conflict("User already exists"))
            }
            Err(other) => Err(map_repository_error(other)),
        }
    }

    /// Legacy direct login: verify the password against the stored hash.
    pub async fn login_direct(&self, credentials: &LoginCredentials) -> Result<Account, Error> {
        let account = self
            .accounts
            .find_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::unauthorized("Invalid credentials"))?;

        let Some(hash) = account.password_hash.as_deref() else {
            // Provider-linked accounts carry no local password.
            return Err(Error::unauthorized("Invalid credentials"));
        };
        if !verify_password(credentials.password(), hash) {
            return Err(Error::unauthorized("Invalid credentials"));
        }
        Ok(account)
    }

    /// Copy drifted provider claims onto the account. Returns whether
    /// anything changed.
    fn refresh_claims(&self, account: &mut Account, identity: &VerifiedIdentity) -> bool {
        let mut changed = false;
        if let Some(name) = identity.display_name.as_deref()
            && account.display_name.as_ref() != name
            && let Ok(display_name) = DisplayName::new(name)
        {
            account.display_name = display_name;
            changed = true;
        }
        if let Some(email) = identity.email.clone()
            && account.email != email
        {
            account.email = email;
            changed = true;
        }
        changed
    }

    async fn save(&self, account: &mut Account) -> Result<(), Error> {
        account.updated_at = self.clock.utc();
        match self.accounts.save(account).await {
            Ok(()) => Ok(()),
            Err(AccountRepositoryError::DuplicateKey { field }) => Err(Error::conflict(format!(
                "An account already exists with this {field}."
            ))),
            Err(other) => Err(map_repository_error(other)),
        }
    }
}

fn map_repository_error(error: AccountRepositoryError) -> Error {
    Error::internal(format!("account repository error: {error}"))
}

fn hash_password(password: &Password) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| Error::internal(format!("failed to hash password: {error}")))
}

fn verify_password(password: &Password, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.expose().as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests;
