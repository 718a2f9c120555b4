//! Account aggregate and its value types.
//!
//! Validation lives in the value-type constructors so a constructed
//! [`Account`] always satisfies the repository invariants: a well-formed,
//! lowercased email and a non-empty display name. Social edges use set
//! semantics (uniqueness enforced, insertion order irrelevant) so repeat
//! follows and swipes cannot duplicate state.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the account value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    UnknownTravelType,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "account id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a well-formed address"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::UnknownTravelType => write!(f, "travel type must be family or genZ"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Stable account identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form.
    pub fn parse(raw: &str) -> Result<Self, AccountValidationError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidId)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; the identity provider is the final authority.
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated, lowercase email address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate, trim, and lowercase an address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalised) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Human readable display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a display name from owned input.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let name = raw.into().trim().to_owned();
        if name.is_empty() {
            return Err(AccountValidationError::EmptyDisplayName);
        }
        if name.chars().count() > DISPLAY_NAME_MAX {
            return Err(AccountValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Travel-style preference shown on the profile and used for matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelType {
    #[default]
    #[serde(rename = "family")]
    Family,
    #[serde(rename = "genZ")]
    GenZ,
}

impl fmt::Display for TravelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Family => f.write_str("family"),
            Self::GenZ => f.write_str("genZ"),
        }
    }
}

impl FromStr for TravelType {
    type Err = AccountValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "family" => Ok(Self::Family),
            "genZ" => Ok(Self::GenZ),
            _ => Err(AccountValidationError::UnknownTravelType),
        }
    }
}

/// Application account.
///
/// ## Invariants
/// - `email` is well-formed and lowercase.
/// - `display_name` is non-empty once trimmed.
/// - Edge sets never contain duplicates and `swiped_users`/`matched_users`
///   never contain the account's own id.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    /// External identity-provider subject id; absent until linked.
    pub provider_id: Option<String>,
    pub email: Email,
    pub display_name: DisplayName,
    /// Argon2 PHC string; only the legacy direct-registration path sets it.
    pub password_hash: Option<String>,
    pub bio: String,
    /// Hosted image URL, or empty when unset.
    pub profile_picture: String,
    pub travel_type: TravelType,
    pub followers: BTreeSet<AccountId>,
    pub following: BTreeSet<AccountId>,
    pub matched_users: BTreeSet<AccountId>,
    pub swiped_users: BTreeSet<AccountId>,
    pub favorites: BTreeSet<String>,
    pub favorite_tours: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Build a fresh account with empty profile and social state.
    pub fn new(email: Email, display_name: DisplayName, now: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::random(),
            provider_id: None,
            email,
            display_name,
            password_hash: None,
            bio: String::new(),
            profile_picture: String::new(),
            travel_type: TravelType::default(),
            followers: BTreeSet::new(),
            following: BTreeSet::new(),
            matched_users: BTreeSet::new(),
            swiped_users: BTreeSet::new(),
            favorites: BTreeSet::new(),
            favorite_tours: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a fresh account already linked to a provider subject.
    pub fn new_linked(
        provider_id: impl Into<String>,
        email: Email,
        display_name: DisplayName,
        now: DateTime<Utc>,
    ) -> Self {
        let mut account = Self::new(email, display_name, now);
        account.provider_id = Some(provider_id.into());
        account
    }

    /// Record that this account swiped `target`. Returns `false` when the
    /// target was already swiped (set semantics: no duplicate entry).
    pub fn record_swipe(&mut self, target: AccountId) -> bool {
        if target == self.id {
            return false;
        }
        self.swiped_users.insert(target)
    }

    /// Whether this account has already swiped `target` (either direction).
    pub fn has_swiped(&self, target: AccountId) -> bool {
        self.swiped_users.contains(&target)
    }

    /// Record a confirmed match. Returns `false` when already matched.
    pub fn record_match(&mut self, other: AccountId) -> bool {
        if other == self.id {
            return false;
        }
        self.matched_users.insert(other)
    }

    /// Toggle membership of `package_id` in the favorites set and return the
    /// resulting membership.
    pub fn toggle_favorite(&mut self, package_id: &str) -> bool {
        if self.favorites.remove(package_id) {
            false
        } else {
            self.favorites.insert(package_id.to_owned());
            true
        }
    }

    /// Toggle membership of `tour_id` in the favorite-tours set and return
    /// the resulting membership.
    pub fn toggle_favorite_tour(&mut self, tour_id: &str) -> bool {
        if self.favorite_tours.remove(tour_id) {
            false
        } else {
            self.favorite_tours.insert(tour_id.to_owned());
            true
        }
    }
}
