//! Test doubles shared by unit and integration tests.
//!
//! Exposed behind the `test-support` feature so integration tests can build
//! the HTTP app against deterministic collaborators: a settable clock, a
//! recording mailer, and a scriptable identity provider.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::account::Email;
use crate::domain::ports::{
    Clock, IdentityProvider, IdentityProviderError, Mailer, MailerError, NewProviderAccount,
    ProviderAccount, VerifiedIdentity,
};

/// Settable clock so expiry boundaries are exact in tests.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    /// Create a clock frozen at `instant`.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(Mutex::new(instant))
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for FixedClock {
    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

/// Mailer double that records deliveries instead of sending them.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    failure: Mutex<Option<MailerError>>,
}

impl RecordingMailer {
    /// Create a mailer that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next delivery with `error`.
    pub fn fail_next(&self, error: MailerError) {
        *self.failure.lock().expect("mailer failure lock") = Some(error);
    }

    /// All recorded (address, code) deliveries, oldest first.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("mailer sent lock").clone()
    }

    /// The code most recently delivered to `address`, if any.
    pub fn last_code_for(&self, address: &str) -> Option<String> {
        self.sent
            .lock()
            .expect("mailer sent lock")
            .iter()
            .rev()
            .find(|(to, _)| to == address)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification_code(&self, to: &Email, code: &str) -> Result<(), MailerError> {
        if let Some(error) = self.failure.lock().expect("mailer failure lock").take() {
            return Err(error);
        }
        self.sent
            .lock()
            .expect("mailer sent lock")
            .push((to.to_string(), code.to_owned()));
        Ok(())
    }
}

/// Scriptable identity provider double.
///
/// Provider accounts live in an in-memory map keyed by email; tokens are
/// accepted or rejected exactly as scripted by the test.
#[derive(Default)]
pub struct StubIdentityProvider {
    accounts: Mutex<BTreeMap<String, ProviderAccount>>,
    tokens: Mutex<BTreeMap<String, VerifiedIdentity>>,
    token_failures: Mutex<BTreeMap<String, IdentityProviderError>>,
    create_failure: Mutex<Option<IdentityProviderError>>,
    custom_token_failure: Mutex<Option<IdentityProviderError>>,
    deleted: Mutex<Vec<String>>,
    next_uid: AtomicU64,
}

impl StubIdentityProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing provider account.
    pub fn register_account(&self, account: ProviderAccount) {
        let key = account
            .email
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| account.uid.clone());
        self.accounts
            .lock()
            .expect("provider accounts lock")
            .insert(key, account);
    }

    /// Script a bearer token to verify as `identity`.
    pub fn accept_token(&self, token: &str, identity: VerifiedIdentity) {
        self.tokens
            .lock()
            .expect("provider tokens lock")
            .insert(token.to_owned(), identity);
    }

    /// Script a bearer token to fail verification with `error`.
    pub fn reject_token(&self, token: &str, error: IdentityProviderError) {
        self.token_failures
            .lock()
            .expect("provider token failures lock")
            .insert(token.to_owned(), error);
    }

    /// Fail the next `create_account` call with `error`.
    pub fn fail_next_create(&self, error: IdentityProviderError) {
        *self.create_failure.lock().expect("provider create lock") = Some(error);
    }

    /// Fail every `issue_custom_token` call with `error`.
    pub fn fail_custom_tokens(&self, error: IdentityProviderError) {
        *self
            .custom_token_failure
            .lock()
            .expect("provider custom token lock") = Some(error);
    }

    /// Whether a provider account exists for `email`.
    pub fn has_account(&self, email: &str) -> bool {
        self.accounts
            .lock()
            .expect("provider accounts lock")
            .contains_key(email)
    }

    /// Uids deleted through the compensation path, oldest first.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("provider deleted lock").clone()
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<ProviderAccount>, IdentityProviderError> {
        Ok(self
            .accounts
            .lock()
            .expect("provider accounts lock")
            .get(email.as_ref())
            .cloned())
    }

    async fn create_account(
        &self,
        account: NewProviderAccount,
    ) -> Result<ProviderAccount, IdentityProviderError> {
        if let Some(error) = self.create_failure.lock().expect("provider create lock").take() {
            return Err(error);
        }
        let mut accounts = self.accounts.lock().expect("provider accounts lock");
        if accounts.contains_key(account.email.as_ref()) {
            return Err(IdentityProviderError::EmailAlreadyInUse);
        }
        let uid = format!("uid-{}", self.next_uid.fetch_add(1, Ordering::Relaxed));
        let created = ProviderAccount {
            uid,
            email: Some(account.email.clone()),
            display_name: Some(account.display_name.to_string()),
            email_verified: account.email_verified,
        };
        accounts.insert(account.email.to_string(), created.clone());
        Ok(created)
    }

    async fn delete_account(&self, uid: &str) -> Result<(), IdentityProviderError> {
        let mut accounts = self.accounts.lock().expect("provider accounts lock");
        accounts.retain(|_, account| account.uid != uid);
        self.deleted
            .lock()
            .expect("provider deleted lock")
            .push(uid.to_owned());
        Ok(())
    }

    async fn verify_id_token(
        &self,
        token: &str,
    ) -> Result<VerifiedIdentity, IdentityProviderError> {
        if let Some(error) = self
            .token_failures
            .lock()
            .expect("provider token failures lock")
            .get(token)
        {
            return Err(error.clone());
        }
        self.tokens
            .lock()
            .expect("provider tokens lock")
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityProviderError::InvalidToken {
                message: "unknown token".to_owned(),
            })
    }

    async fn issue_custom_token(&self, uid: &str) -> Result<String, IdentityProviderError> {
        if let Some(error) = self
            .custom_token_failure
            .lock()
            .expect("provider custom token lock")
            .clone()
        {
            return Err(error);
        }
        Ok(format!("custom-token-{uid}"))
    }
}
