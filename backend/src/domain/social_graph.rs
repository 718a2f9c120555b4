//! Social graph operations: follow edges, favorites, and the swipe/match
//! workflow.
//!
//! Every mutation is a read-modify-write on one or two account records with
//! no cross-record transaction; the port exposes no pairwise atomic update.
//! See DESIGN.md on why that inherited contract is kept as-is.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::account::{Account, AccountId};
use crate::domain::error::Error;
use crate::domain::match_record::MatchRecord;
use crate::domain::ports::{AccountRepository, AccountRepositoryError, Clock, MatchLog};

/// Direction of a swipe evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl FromStr for SwipeDirection {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Result of a swipe, reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// The swipe completed a mutual right-swipe.
    Matched,
    /// The swipe was recorded; no reciprocal state exists yet.
    Recorded,
}

/// Display fields for a matched account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedProfile {
    pub id: AccountId,
    pub name: String,
    pub profile_picture: String,
    pub bio: String,
}

/// Result of a favorite-package toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteUpdate {
    /// Whether the id is a favorite after the toggle.
    pub favorited: bool,
    /// The resulting favorites set.
    pub favorites: Vec<String>,
}

/// Follow/unfollow, favorite toggles, and the swipe/match workflow.
#[derive(Clone)]
pub struct SocialGraphService {
    accounts: Arc<dyn AccountRepository>,
    matches: Arc<dyn MatchLog>,
    clock: Arc<dyn Clock>,
}

impl SocialGraphService {
    /// Create a new service over the given collaborators.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        matches: Arc<dyn MatchLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            matches,
            clock,
        }
    }

    async fn load(&self, id: AccountId, missing: &str) -> Result<Account, Error> {
        self.accounts
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(missing))
    }

    async fn persist(&self, account: &mut Account) -> Result<(), Error> {
        account.updated_at = self.clock.utc();
        self.accounts.save(account).await.map_err(map_repository_error)
    }

    /// Make the caller follow `target`. Idempotent per edge set: re-invoking
    /// after success changes nothing and duplicates are impossible.
    pub async fn follow(&self, caller: AccountId, target: AccountId) -> Result<(), Error> {
        let mut target_account = self.load(target, "User not found").await?;
        let mut caller_account = self.load(caller, "User not found").await?;

        if target_account.followers.insert(caller) {
            self.persist(&mut target_account).await?;
        }
        if caller_account.following.insert(target) {
            self.persist(&mut caller_account).await?;
        }
        Ok(())
    }

    /// Remove the follow edge in both directions. Calling without a prior
    /// follow is a no-op, not an error.
    pub async fn unfollow(&self, caller: AccountId, target: AccountId) -> Result<(), Error> {
        let mut target_account = self.load(target, "User not found").await?;
        let mut caller_account = self.load(caller, "User not found").await?;

        if target_account.followers.remove(&caller) {
            self.persist(&mut target_account).await?;
        }
        if caller_account.following.remove(&target) {
            self.persist(&mut caller_account).await?;
        }
        Ok(())
    }

    /// Whether the caller currently follows `target`.
    pub async fn follow_status(
        &self,
        caller: AccountId,
        target: AccountId,
    ) -> Result<bool, Error> {
        let target_account = self.load(target, "User profile not found.").await?;
        Ok(target_account.followers.contains(&caller))
    }

    /// Toggle a package in the caller's favorites and return the resulting
    /// membership plus the full set.
    pub async fn toggle_favorite_package(
        &self,
        caller: AccountId,
        package_id: &str,
    ) -> Result<FavoriteUpdate, Error> {
        let mut account = self.load(caller, "User not found.").await?;
        let favorited = account.toggle_favorite(package_id);
        self.persist(&mut account).await?;
        Ok(FavoriteUpdate {
            favorited,
            favorites: account.favorites.iter().cloned().collect(),
        })
    }

    /// Toggle a tour in the caller's favorite tours and return the
    /// resulting membership.
    pub async fn toggle_favorite_tour(
        &self,
        caller: AccountId,
        tour_id: &str,
    ) -> Result<bool, Error> {
        let mut account = self.load(caller, "User not found.").await?;
        let favorited = account.toggle_favorite_tour(tour_id);
        self.persist(&mut account).await?;
        Ok(favorited)
    }

    /// Record a swipe and detect a mutual match.
    ///
    /// The swipe is recorded regardless of direction. A right-swipe against
    /// a target who already right-swiped the caller completes a match:
    /// both `matched_users` sets gain the other id and exactly one match
    /// record is appended. Repeat swipes cannot re-trigger the match
    /// because an already-matched pair is refused.
    pub async fn swipe(
        &self,
        caller: AccountId,
        target: AccountId,
        direction: SwipeDirection,
    ) -> Result<SwipeOutcome, Error> {
        if caller == target {
            return Err(Error::invalid_request("You cannot swipe on yourself."));
        }

        let mut caller_account = self.load(caller, "Swiping user not found").await?;
        if caller_account.record_swipe(target) {
            self.persist(&mut caller_account).await?;
        }

        if direction != SwipeDirection::Right {
            return Ok(SwipeOutcome::Recorded);
        }

        let mut target_account = self.load(target, "Swiped user not found").await?;
        let reciprocal = target_account.has_swiped(caller);
        let already_matched = caller_account.matched_users.contains(&target);
        if !reciprocal || already_matched {
            return Ok(SwipeOutcome::Recorded);
        }

        caller_account.record_match(target);
        target_account.record_match(caller);
        self.persist(&mut caller_account).await?;
        self.persist(&mut target_account).await?;

        self.matches
            .append(MatchRecord::confirmed_at(caller, target, self.clock.utc()))
            .await
            .map_err(|error| Error::internal(format!("failed to record match: {error}")))?;

        Ok(SwipeOutcome::Matched)
    }

    /// The caller's matches expanded to display fields.
    pub async fn matched_profiles(
        &self,
        caller: AccountId,
    ) -> Result<Vec<MatchedProfile>, Error> {
        let account = self.load(caller, "Current user not found.").await?;
        let mut profiles = Vec::with_capacity(account.matched_users.len());
        for id in &account.matched_users {
            // A missing matched account is skipped rather than failing the
            // whole listing.
            if let Some(matched) = self
                .accounts
                .find_by_id(*id)
                .await
                .map_err(map_repository_error)?
            {
                profiles.push(MatchedProfile {
                    id: matched.id,
                    name: matched.display_name.to_string(),
                    profile_picture: matched.profile_picture,
                    bio: matched.bio,
                });
            }
        }
        Ok(profiles)
    }

    /// Accounts the caller has not yet evaluated: everyone except the
    /// caller and the already-swiped set.
    pub async fn swipe_deck(&self, caller: AccountId) -> Result<Vec<Account>, Error> {
        let account = self
            .load(caller, "Current user not found for swiping.")
            .await?;
        let mut exclude = account.swiped_users.clone();
        exclude.insert(account.id);
        self.accounts
            .list_excluding(&exclude)
            .await
            .map_err(map_repository_error)
    }
}

fn map_repository_error(error: AccountRepositoryError) -> Error {
    Error::internal(format!("account repository error: {error}"))
}
