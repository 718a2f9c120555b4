//! In-process document-store adapters.
//!
//! Accounts, verification codes, and the match log live in mutex-guarded
//! collections keyed the same way the external document database keys them.
//! A durable adapter slots in behind the same ports without touching the
//! domain; the single mutex here incidentally serialises the two-record
//! social-graph writes, which nothing in the domain relies upon.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::domain::account::{Account, AccountId, Email};
use crate::domain::match_record::MatchRecord;
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, Clock, ConsumeOutcome, DuplicateField, MatchLog,
    MatchLogError, VerificationCodeStore, VerificationCodeStoreError,
};
use crate::domain::verification::{self, VerificationCode};

fn lock_accounts<'a>(
    cell: &'a Mutex<BTreeMap<AccountId, Account>>,
) -> Result<MutexGuard<'a, BTreeMap<AccountId, Account>>, AccountRepositoryError> {
    cell.lock().map_err(|_| AccountRepositoryError::Connection {
        message: "account store lock poisoned".to_owned(),
    })
}

/// Account collection held in process memory.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<BTreeMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn duplicate_of(
        accounts: &BTreeMap<AccountId, Account>,
        candidate: &Account,
    ) -> Option<DuplicateField> {
        for existing in accounts.values() {
            if existing.id == candidate.id {
                continue;
            }
            if existing.email == candidate.email {
                return Some(DuplicateField::Email);
            }
            if let (Some(a), Some(b)) = (&existing.provider_id, &candidate.provider_id)
                && a == b
            {
                return Some(DuplicateField::ProviderId);
            }
        }
        None
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut accounts = lock_accounts(&self.accounts)?;
        if let Some(field) = Self::duplicate_of(&accounts, account) {
            return Err(AccountRepositoryError::DuplicateKey { field });
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn save(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut accounts = lock_accounts(&self.accounts)?;
        if !accounts.contains_key(&account.id) {
            return Err(AccountRepositoryError::Query {
                message: format!("account {} does not exist", account.id),
            });
        }
        if let Some(field) = Self::duplicate_of(&accounts, account) {
            return Err(AccountRepositoryError::DuplicateKey { field });
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let accounts = lock_accounts(&self.accounts)?;
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let accounts = lock_accounts(&self.accounts)?;
        Ok(accounts.values().find(|a| &a.email == email).cloned())
    }

    async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let accounts = lock_accounts(&self.accounts)?;
        Ok(accounts
            .values()
            .find(|a| a.provider_id.as_deref() == Some(provider_id))
            .cloned())
    }

    async fn list_excluding(
        &self,
        exclude: &std::collections::BTreeSet<AccountId>,
    ) -> Result<Vec<Account>, AccountRepositoryError> {
        let accounts = lock_accounts(&self.accounts)?;
        Ok(accounts
            .values()
            .filter(|a| !exclude.contains(&a.id))
            .cloned()
            .collect())
    }
}

/// Verification-code collection with passive expiry.
///
/// The store is the authority on expiry: a record past its deadline is
/// treated as absent by the access that observes it and reaped on the spot.
pub struct InMemoryVerificationCodeStore {
    clock: Arc<dyn Clock>,
    codes: Mutex<BTreeMap<Email, VerificationCode>>,
    rng: Mutex<SmallRng>,
}

impl InMemoryVerificationCodeStore {
    /// Create an empty store reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            codes: Mutex::new(BTreeMap::new()),
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    fn lock_codes(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<Email, VerificationCode>>, VerificationCodeStoreError>
    {
        self.codes
            .lock()
            .map_err(|_| VerificationCodeStoreError::Connection {
                message: "verification code store lock poisoned".to_owned(),
            })
    }
}

#[async_trait]
impl VerificationCodeStore for InMemoryVerificationCodeStore {
    async fn issue(&self, email: &Email) -> Result<VerificationCode, VerificationCodeStoreError> {
        let code = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| VerificationCodeStoreError::Connection {
                    message: "code generator lock poisoned".to_owned(),
                })?;
            verification::generate_code(&mut *rng)
        };
        let record = VerificationCode::issued_at(email.clone(), code, self.clock.utc());
        let mut codes = self.lock_codes()?;
        // Upsert: at most one live code per email.
        codes.insert(email.clone(), record.clone());
        Ok(record)
    }

    async fn consume(
        &self,
        email: &Email,
        code: &str,
    ) -> Result<ConsumeOutcome, VerificationCodeStoreError> {
        let now = self.clock.utc();
        let mut codes = self.lock_codes()?;
        let Some(record) = codes.get(email) else {
            return Ok(ConsumeOutcome::NotFound);
        };
        if record.code != code {
            // Reap an expired record even when the presented code is wrong.
            if record.is_expired(now) {
                codes.remove(email);
            }
            return Ok(ConsumeOutcome::NotFound);
        }
        if record.is_expired(now) {
            codes.remove(email);
            return Ok(ConsumeOutcome::Expired);
        }
        // Single use: a live match is deleted before reporting success.
        codes.remove(email);
        Ok(ConsumeOutcome::Consumed)
    }
}

/// Append-only match log held in process memory.
#[derive(Default)]
pub struct InMemoryMatchLog {
    records: Mutex<Vec<MatchRecord>>,
}

impl InMemoryMatchLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the appended records, oldest first.
    pub fn records(&self) -> Vec<MatchRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MatchLog for InMemoryMatchLog {
    async fn append(&self, record: MatchRecord) -> Result<(), MatchLogError> {
        let mut records = self.records.lock().map_err(|_| MatchLogError::Append {
            message: "match log lock poisoned".to_owned(),
        })?;
        records.push(record);
        Ok(())
    }
}
