//! Driving ports for the matching engine.

use async_trait::async_trait;

use crate::domain::{Candidate, ConcertId, ConfirmedMatch, Decision, Error, MatchingId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchingCommand: Send + Sync {
    /// Scan other members' favorites and refresh pending records for every
    /// member sharing at least one concert with `user`.
    async fn discover_candidates(&self, user: &UserId) -> Result<Vec<Candidate>, Error>;

    /// Apply `reviewer`'s verdict to a pending record they own.
    async fn review(
        &self,
        reviewer: &UserId,
        matching: &MatchingId,
        decision: Decision,
    ) -> Result<(), Error>;

    /// Unmatch from `target_username` and unfavorite `concerts` for both.
    async fn delete_match(
        &self,
        user: &UserId,
        target_username: &str,
        concerts: &[ConcertId],
    ) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchesQuery: Send + Sync {
    /// Pairs where both directions are `YES`.
    async fn confirmed_matches(&self, user: &UserId) -> Result<Vec<ConfirmedMatch>, Error>;
}
