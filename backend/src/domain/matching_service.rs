//! Matching engine service.
//!
//! Every call re-derives its answer from the repositories; nothing is
//! cached between requests. Discovery compares the caller's favorites with
//! every other member's in memory after one bulk load, and only ever writes
//! the caller's own `(user, target)` direction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::favorites_service::unlink_favorite;
use super::repository_errors::{map_concert_error, map_matching_error, map_user_error};
use crate::domain::ports::{
    ConcertRepository, MatchesQuery, MatchingCommand, MatchingRepository, UserRepository,
};
use crate::domain::{
    Candidate, ConcertId, ConfirmedMatch, Decision, Error, Matching, MatchingError, MatchingId,
    Member, ReviewRejection, UserId, shared_concerts,
};

/// Matching service implementing the driving ports.
#[derive(Clone)]
pub struct MatchingService<U, C, M> {
    users: Arc<U>,
    concerts: Arc<C>,
    matchings: Arc<M>,
}

impl<U, C, M> MatchingService<U, C, M> {
    /// Build the service over the user, concert and matching repositories.
    pub fn new(users: Arc<U>, concerts: Arc<C>, matchings: Arc<M>) -> Self {
        Self {
            users,
            concerts,
            matchings,
        }
    }
}

impl<U, C, M> MatchingService<U, C, M>
where
    U: UserRepository,
    C: ConcertRepository,
    M: MatchingRepository,
{
    async fn members_by_id(&self, ids: &[UserId]) -> Result<HashMap<UserId, Member>, Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let members = self.users.members(ids).await.map_err(map_user_error)?;
        Ok(members
            .into_iter()
            .map(|member| (member.id, member))
            .collect())
    }

    fn not_processable(reviewer: &UserId, matching: &MatchingId, reason: ReviewRejection) -> Error {
        debug!(%reviewer, %matching, %reason, "review rejected");
        MatchingError::NotProcessable.into()
    }
}

#[async_trait]
impl<U, C, M> MatchingCommand for MatchingService<U, C, M>
where
    U: UserRepository,
    C: ConcertRepository,
    M: MatchingRepository,
{
    async fn discover_candidates(&self, user: &UserId) -> Result<Vec<Candidate>, Error> {
        let mine = self
            .concerts
            .favorites_of(user)
            .await
            .map_err(map_concert_error)?;
        if mine.is_empty() {
            return Ok(Vec::new());
        }
        let others = self
            .concerts
            .favorites_of_others(user)
            .await
            .map_err(map_concert_error)?;

        let mut pending: Vec<Matching> = Vec::new();
        for other in others.iter().filter(|other| other.user_id != *user) {
            let shared = shared_concerts(&mine, &other.concerts);
            if shared.is_empty() {
                continue;
            }
            match self
                .matchings
                .upsert_pending(user, &other.user_id, &shared)
                .await
                .map_err(map_matching_error)?
            {
                Some(matching) => pending.push(matching),
                None => debug!(%user, target = %other.user_id, "pair already decided"),
            }
        }

        let ids: Vec<UserId> = pending.iter().map(|matching| matching.target_id).collect();
        let mut members = self.members_by_id(&ids).await?;
        Ok(pending
            .into_iter()
            .filter_map(|matching| {
                let Some(member) = members.remove(&matching.target_id) else {
                    warn!(target = %matching.target_id, "candidate member missing");
                    return None;
                };
                Some(Candidate {
                    matching_id: matching.id,
                    member,
                    concerts: matching.matched_concerts,
                })
            })
            .collect())
    }

    async fn review(
        &self,
        reviewer: &UserId,
        matching_id: &MatchingId,
        decision: Decision,
    ) -> Result<(), Error> {
        let Some(matching) = self
            .matchings
            .find_by_id(matching_id)
            .await
            .map_err(map_matching_error)?
        else {
            return Err(Self::not_processable(
                reviewer,
                matching_id,
                ReviewRejection::NotFound,
            ));
        };
        let decision = matching
            .review(*reviewer, decision)
            .map_err(|reason| Self::not_processable(reviewer, matching_id, reason))?;

        let changed = self
            .matchings
            .record_decision(matching_id, reviewer, decision)
            .await
            .map_err(map_matching_error)?;
        if !changed {
            // Another request decided the record between read and write.
            return Err(Self::not_processable(
                reviewer,
                matching_id,
                ReviewRejection::AlreadyReviewed,
            ));
        }
        info!(%reviewer, matching = %matching_id, %decision, "matching reviewed");
        Ok(())
    }

    async fn delete_match(
        &self,
        user: &UserId,
        target_username: &str,
        concerts: &[ConcertId],
    ) -> Result<(), Error> {
        if concerts.is_empty() {
            return Err(MatchingError::MissingConcertIds.into());
        }
        let target = self
            .users
            .find_by_username(target_username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| MatchingError::TargetNotFound(target_username.to_owned()))?;

        let removed = self
            .matchings
            .delete_accepted_pair(user, &target.id)
            .await
            .map_err(map_matching_error)?;
        debug!(%user, target = %target.id, removed, "accepted matchings deleted");

        // Earlier steps stay committed when a later unfavorite fails.
        for concert in concerts {
            for member in [user, &target.id] {
                let unlinked = unlink_favorite(self.concerts.as_ref(), member, concert)
                    .await
                    .map_err(map_concert_error)?;
                if let Err(reason) = unlinked {
                    warn!(%user, target = %target.id, %reason, "match deletion partially applied");
                    return Err(MatchingError::PartialFailure {
                        concert: concert.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<U, C, M> MatchesQuery for MatchingService<U, C, M>
where
    U: UserRepository,
    C: ConcertRepository,
    M: MatchingRepository,
{
    async fn confirmed_matches(&self, user: &UserId) -> Result<Vec<ConfirmedMatch>, Error> {
        let accepted = self
            .matchings
            .accepted_by(user)
            .await
            .map_err(map_matching_error)?;

        let mut mutual = Vec::with_capacity(accepted.len());
        for matching in accepted {
            let reciprocal = self
                .matchings
                .find_pair(&matching.target_id, user)
                .await
                .map_err(map_matching_error)?;
            if reciprocal.is_some_and(|other| other.decision == Decision::Yes) {
                mutual.push(matching);
            }
        }

        let ids: Vec<UserId> = mutual.iter().map(|matching| matching.target_id).collect();
        let mut members = self.members_by_id(&ids).await?;
        Ok(mutual
            .into_iter()
            .filter_map(|matching| {
                members
                    .remove(&matching.target_id)
                    .map(|member| ConfirmedMatch {
                        member,
                        concerts: matching.matched_concerts,
                    })
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "matching_service_tests.rs"]
mod tests;
