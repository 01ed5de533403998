//! Directed matching records and the review state machine.
//!
//! A matching links an ordered pair `(user, target)` who share at least one
//! favorited concert. Each direction is its own record with its own
//! decision:
//!
//! ```text
//! UNKNOWN --review(YES)--> YES
//! UNKNOWN --review(NO)---> NO
//! ```
//!
//! `YES` and `NO` are terminal. A pair is a confirmed match only while both
//! directions are `YES`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ConcertId, Error, Member, UserId};

/// Message returned for every rejected review.
pub const NOT_PROCESSABLE_MESSAGE: &str = "Failed to process matching";

/// Identifier of one directed matching record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchingId(Uuid);

impl MatchingId {
    /// Wrap a stored record id.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Fresh random (v4) id for a new record.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID, as persisted.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MatchingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MatchingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A reviewer's verdict on a matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Reviewer wants to connect. Terminal.
    Yes,
    /// Reviewer declined. Terminal.
    No,
    /// Not reviewed yet; the only state a review may leave.
    Unknown,
}

impl Decision {
    /// Storage and wire form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text did not name a decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown decision: {0}")]
pub struct ParseDecisionError(pub String);

impl FromStr for Decision {
    type Err = ParseDecisionError;

    /// Parses `YES`, `NO` or `UNKNOWN` exactly.
    ///
    /// # Examples
    /// ```
    /// use encore::domain::Decision;
    ///
    /// assert_eq!("YES".parse::<Decision>().unwrap(), Decision::Yes);
    /// assert!("yes".parse::<Decision>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            "UNKNOWN" => Ok(Self::Unknown),
            other => Err(ParseDecisionError(other.to_owned())),
        }
    }
}

/// Why a review was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReviewRejection {
    #[error("matching not found")]
    NotFound,
    #[error("reviewer does not own the matching")]
    NotOwner,
    #[error("matching already reviewed")]
    AlreadyReviewed,
    #[error("decision must be YES or NO")]
    InvalidDecision,
}

/// One directed matching record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    pub id: MatchingId,
    pub user_id: UserId,
    pub target_id: UserId,
    pub decision: Decision,
    pub matched_concerts: Vec<ConcertId>,
}

impl Matching {
    /// Check that `reviewer` may move this record to `decision`.
    ///
    /// Ownership, current state and the requested decision are all checked;
    /// the record itself is not mutated so callers can persist the change
    /// conditionally.
    pub fn review(&self, reviewer: UserId, decision: Decision) -> Result<Decision, ReviewRejection> {
        if self.user_id != reviewer {
            return Err(ReviewRejection::NotOwner);
        }
        if self.decision.is_decided() {
            return Err(ReviewRejection::AlreadyReviewed);
        }
        if !decision.is_decided() {
            return Err(ReviewRejection::InvalidDecision);
        }
        Ok(decision)
    }
}

/// A member sharing concerts with the caller, awaiting or carrying the
/// caller's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub matching_id: MatchingId,
    pub member: Member,
    pub concerts: Vec<ConcertId>,
}

/// A mutual `YES`/`YES` pair, seen from the caller's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedMatch {
    pub member: Member,
    pub concerts: Vec<ConcertId>,
}

/// Concerts present in both lists, in `mine` order, without duplicates.
///
/// # Examples
/// ```
/// use encore::domain::{shared_concerts, ConcertId};
///
/// let ids = |raw: &[&str]| raw.iter().map(|s| ConcertId::new(s).unwrap()).collect::<Vec<_>>();
/// let shared = shared_concerts(&ids(&["a", "b", "c"]), &ids(&["c", "a"]));
/// assert_eq!(shared, ids(&["a", "c"]));
/// ```
pub fn shared_concerts(mine: &[ConcertId], theirs: &[ConcertId]) -> Vec<ConcertId> {
    let theirs: HashSet<&ConcertId> = theirs.iter().collect();
    let mut seen = HashSet::new();
    mine.iter()
        .filter(|id| theirs.contains(id) && seen.insert(*id))
        .cloned()
        .collect()
}

/// Matching engine failures surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchingError {
    /// Covers unknown id, wrong owner, decided record and invalid decision.
    #[error("{}", NOT_PROCESSABLE_MESSAGE)]
    NotProcessable,
    #[error("user {0} not found")]
    TargetNotFound(String),
    #[error("concertIds must list at least one concert")]
    MissingConcertIds,
    #[error("failed to unfavorite concert {concert} while deleting match")]
    PartialFailure { concert: ConcertId },
}

impl From<MatchingError> for Error {
    fn from(value: MatchingError) -> Self {
        let message = value.to_string();
        match value {
            MatchingError::NotProcessable => Error::invalid_request(message)
                .with_details(serde_json::json!({ "code": "matching_not_processable" })),
            MatchingError::TargetNotFound(username) => Error::not_found(message)
                .with_details(serde_json::json!({ "username": username })),
            MatchingError::MissingConcertIds => Error::invalid_request(message)
                .with_details(serde_json::json!({ "field": "concertIds", "code": "missing_concert_ids" })),
            MatchingError::PartialFailure { .. } => Error::internal(message),
        }
    }
}
