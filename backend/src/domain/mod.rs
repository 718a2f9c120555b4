//! Domain entities, value types, services, and ports.
//!
//! Types here are transport agnostic: inbound adapters parse payloads into
//! them, outbound adapters persist or transmit them. Invariants live in the
//! value-type constructors and are documented on each type.

pub mod account;
pub mod auth;
pub mod error;
pub mod match_record;
pub mod ports;
pub mod profile;
pub mod registration;
pub mod social_graph;
pub mod verification;

pub use self::account::{
    Account, AccountId, AccountValidationError, DisplayName, Email, TravelType,
};
pub use self::auth::{CredentialValidationError, LoginCredentials, Password};
pub use self::error::{Error, ErrorCode};
pub use self::match_record::{MatchRecord, MatchStatus};
pub use self::profile::{ProfileService, ProfileUpdate};
pub use self::registration::{RegisteredAccount, RegistrationRequest, RegistrationService};
pub use self::social_graph::{
    FavoriteUpdate, MatchedProfile, SocialGraphService, SwipeDirection, SwipeOutcome,
};
pub use self::verification::VerificationCode;

/// Convenient result alias for fallible domain operations.
pub type DomainResult<T> = Result<T, Error>;
