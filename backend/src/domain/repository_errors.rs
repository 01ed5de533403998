//! Mapping from driven-port failures to domain errors.
//!
//! Connection failures become `service_unavailable`; anything else that
//! escapes a repository is an `internal` error. Upstream ticketing failures
//! collapse into one generic message and are logged here with the detail.

use tracing::warn;

use super::Error;
use super::ports::{
    ConcertRepositoryError, EventSourceError, MatchingRepositoryError, UserPersistenceError,
};

/// Client-facing message for every ticketing API failure.
pub const UPSTREAM_UNAVAILABLE_MESSAGE: &str = "Unable to fetch concerts. Please try again later.";

pub(crate) fn map_concert_error(error: ConcertRepositoryError) -> Error {
    match error {
        ConcertRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("concert repository unavailable: {message}"))
        }
        ConcertRepositoryError::Query { message } => {
            Error::internal(format!("concert repository error: {message}"))
        }
    }
}

pub(crate) fn map_matching_error(error: MatchingRepositoryError) -> Error {
    match error {
        MatchingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("matching repository unavailable: {message}"))
        }
        MatchingRepositoryError::Query { message } => {
            Error::internal(format!("matching repository error: {message}"))
        }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict("username already taken").with_details(serde_json::json!({
                "field": "username",
                "username": username,
                "code": "duplicate_username",
            }))
        }
    }
}

pub(crate) fn map_event_source_error(error: EventSourceError) -> Error {
    warn!(error = %error, "ticketing API request failed");
    Error::service_unavailable(UPSTREAM_UNAVAILABLE_MESSAGE)
}
