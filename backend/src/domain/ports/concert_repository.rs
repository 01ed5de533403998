//! Driven port for concert and favorite persistence.
//!
//! Concert rows are keyed by the provider's event id and are only ever
//! created, never removed. Favorite links are unique per `(user, concert)`.

use async_trait::async_trait;

use crate::domain::{ConcertId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by concert repository adapters.
    pub enum ConcertRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "concert repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "concert repository query failed: {message}",
    }
}

/// Favorited concerts of one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFavorites {
    pub user_id: UserId,
    pub concerts: Vec<ConcertId>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConcertRepository: Send + Sync {
    /// Create the concert row unless one already exists for `concert`.
    async fn ensure_concert(&self, concert: &ConcertId) -> Result<(), ConcertRepositoryError>;

    async fn concert_exists(&self, concert: &ConcertId) -> Result<bool, ConcertRepositoryError>;

    /// Link `user` to `concert`. Returns `false` when the link already existed.
    async fn add_favorite(
        &self,
        user: &UserId,
        concert: &ConcertId,
    ) -> Result<bool, ConcertRepositoryError>;

    /// Remove the link. Returns `false` when there was nothing to remove.
    async fn remove_favorite(
        &self,
        user: &UserId,
        concert: &ConcertId,
    ) -> Result<bool, ConcertRepositoryError>;

    /// The member's favorites, oldest first.
    async fn favorites_of(&self, user: &UserId) -> Result<Vec<ConcertId>, ConcertRepositoryError>;

    /// Favorites of every member except `excluded` who has at least one.
    async fn favorites_of_others(
        &self,
        excluded: &UserId,
    ) -> Result<Vec<MemberFavorites>, ConcertRepositoryError>;
}
