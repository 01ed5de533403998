//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed concert, matching and member model
//! used by the HTTP and persistence adapters, together with the services
//! that implement the driving ports. Nothing here knows about actix,
//! Diesel or reqwest.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic error payload.
//! - [`ConcertId`], [`Matching`], [`Decision`]: the favoriting and matching
//!   model.
//! - [`Member`], [`Account`], [`UserProfile`]: identities and display data.
//! - Services: [`FavoritesService`], [`MatchingService`],
//!   [`ConcertSearchService`], [`AccountService`].

pub mod account_service;
pub mod auth;
pub mod concert;
pub mod concert_search_service;
pub mod error;
pub mod favorites_service;
pub mod matching;
pub mod matching_service;
pub mod ports;
pub mod profile;
mod repository_errors;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, MalformedDigest, PASSWORD_MIN_CHARS, PasswordDigest,
    PasswordHashError, PasswordHasher, Registration, RegistrationValidationError,
};
pub use self::concert::{ConcertId, ConcertIdError, FavoriteError, FavoriteOutcome};
pub use self::concert_search_service::ConcertSearchService;
pub use self::error::{EmptyErrorMessage, Error, ErrorCode, TRACE_ID_HEADER};
pub use self::favorites_service::FavoritesService;
pub use self::matching::{
    Candidate, ConfirmedMatch, Decision, Matching, MatchingError, MatchingId,
    NOT_PROCESSABLE_MESSAGE, ParseDecisionError, ReviewRejection, shared_concerts,
};
pub use self::matching_service::MatchingService;
pub use self::profile::{
    ALLOWED_AVATARS, ALLOWED_FACULTIES, ALLOWED_TERMS, DEFAULT_AVATAR, MAX_FAVOURITES,
    ProfileField, ProfilePatch, ProfileValidationError, UserProfile, ValidProfilePatch,
};
pub use self::repository_errors::UPSTREAM_UNAVAILABLE_MESSAGE;
pub use self::trace_id::TraceId;
pub use self::user::{Account, EmailAddress, Member, UserId, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use encore::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
