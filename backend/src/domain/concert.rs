//! Concerts and the favoriting outcomes around them.
//!
//! A concert is known locally only by the ticketing provider's opaque event
//! id. Rows are created lazily on first favorite and never deleted here.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Error;

/// Longest external event id accepted.
pub const CONCERT_ID_MAX: usize = 200;

/// External concert id was unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConcertIdError {
    #[error("concert id must not be empty")]
    Empty,
    #[error("concert id must be at most {max} characters", max = CONCERT_ID_MAX)]
    TooLong,
}

/// Opaque event identifier issued by the ticketing provider.
///
/// # Examples
/// ```
/// use encore::domain::ConcertId;
///
/// let id = ConcertId::new("  vvG1IZ9pTZk0 ").unwrap();
/// assert_eq!(id.as_str(), "vvG1IZ9pTZk0");
/// assert!(ConcertId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConcertId(String);

impl ConcertId {
    /// Trim and validate a provider event id.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ConcertIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ConcertIdError::Empty);
        }
        if trimmed.chars().count() > CONCERT_ID_MAX {
            return Err(ConcertIdError::TooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConcertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ConcertId {
    type Error = ConcertIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConcertId> for String {
    fn from(value: ConcertId) -> Self {
        value.0
    }
}

/// Result of a favorite request; both variants are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Created,
    AlreadyFavorited,
}

/// Request-level favoriting failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FavoriteError {
    #[error("concert id is required")]
    MissingConcertIdentifier,
    #[error("concert {0} not found")]
    ConcertNotFound(ConcertId),
    /// The concert exists but the member never favorited it.
    #[error("concert {0} is not in favorites")]
    NotFavorited(ConcertId),
}

impl From<FavoriteError> for Error {
    fn from(value: FavoriteError) -> Self {
        let message = value.to_string();
        match value {
            FavoriteError::MissingConcertIdentifier => Error::invalid_request(message)
                .with_details(serde_json::json!({ "field": "concert", "code": "missing_concert_id" })),
            FavoriteError::ConcertNotFound(id) => Error::not_found(message)
                .with_details(serde_json::json!({ "concert": id.as_str() })),
            FavoriteError::NotFavorited(id) => Error::invalid_request(message)
                .with_details(serde_json::json!({ "concert": id.as_str(), "code": "not_favorited" })),
        }
    }
}
