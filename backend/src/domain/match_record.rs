//! Durable log entry marking a mutual right-swipe between two accounts.

use chrono::{DateTime, Utc};

use crate::domain::account::AccountId;

/// Lifecycle status of a match. Only `Matched` exists today; the variant is
/// kept explicit so an unmatch flow can extend it without a schema change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStatus {
    #[default]
    Matched,
}

/// Append-only record of a confirmed match.
///
/// Written exactly once per mutual right-swipe; no in-scope operation reads
/// it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// The account whose swipe completed the match.
    pub initiator: AccountId,
    pub matched: AccountId,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Build a record for a match confirmed at `now`.
    pub fn confirmed_at(initiator: AccountId, matched: AccountId, now: DateTime<Utc>) -> Self {
        Self {
            initiator,
            matched,
            status: MatchStatus::Matched,
            created_at: now,
        }
    }
}
