//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`EventSource`]) are implemented by outbound
//! adapters. Driving ports (`*Command`, `*Query`, [`ConcertSearch`],
//! [`LoginService`]) are implemented by domain services and called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod concert_repository;
mod concert_search;
mod event_source;
mod favorites;
mod login_service;
mod matching;
mod matching_repository;
mod user_repository;

#[cfg(test)]
pub use accounts::{MockAccountCommand, MockAccountQuery};
pub use accounts::{AccountCommand, AccountQuery};
#[cfg(test)]
pub use concert_repository::MockConcertRepository;
pub use concert_repository::{ConcertRepository, ConcertRepositoryError, MemberFavorites};
#[cfg(test)]
pub use concert_search::MockConcertSearch;
pub use concert_search::{ConcertSearch, Location, SearchFilters, UnknownLocation};
#[cfg(test)]
pub use event_source::MockEventSource;
pub use event_source::{EventPage, EventQuery, EventSource, EventSourceError};
#[cfg(test)]
pub use favorites::{MockFavoritesCommand, MockFavoritesQuery};
pub use favorites::{FavoritesCommand, FavoritesQuery};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use matching::{MockMatchesQuery, MockMatchingCommand};
pub use matching::{MatchesQuery, MatchingCommand};
#[cfg(test)]
pub use matching_repository::MockMatchingRepository;
pub use matching_repository::{MatchingRepository, MatchingRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    NewAccount, StoredCredentials, UserPersistenceError, UserRepository,
};
