//! Driven port for directed matching records.

use async_trait::async_trait;

use crate::domain::{ConcertId, Decision, Matching, MatchingId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by matching repository adapters.
    pub enum MatchingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "matching repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "matching repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchingRepository: Send + Sync {
    /// The record for the ordered pair `(user, target)`, if any.
    async fn find_pair(
        &self,
        user: &UserId,
        target: &UserId,
    ) -> Result<Option<Matching>, MatchingRepositoryError>;

    /// Get or create the `UNKNOWN` record for `(user, target)` and replace its
    /// matched concerts with `concerts`.
    ///
    /// Returns `None` without touching anything when the pair has already
    /// been decided. Concurrent callers converge on a single row.
    async fn upsert_pending(
        &self,
        user: &UserId,
        target: &UserId,
        concerts: &[ConcertId],
    ) -> Result<Option<Matching>, MatchingRepositoryError>;

    async fn find_by_id(&self, id: &MatchingId)
    -> Result<Option<Matching>, MatchingRepositoryError>;

    /// Store `decision` only while the record is owned by `owner` and still
    /// `UNKNOWN`. Returns whether a record changed.
    async fn record_decision(
        &self,
        id: &MatchingId,
        owner: &UserId,
        decision: Decision,
    ) -> Result<bool, MatchingRepositoryError>;

    /// Records where `user` is the reviewing side and said `YES`.
    async fn accepted_by(&self, user: &UserId) -> Result<Vec<Matching>, MatchingRepositoryError>;

    /// Delete the `YES` records in both directions between `a` and `b`,
    /// clearing their concert links. Returns how many records went.
    async fn delete_accepted_pair(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<usize, MatchingRepositoryError>;
}
