//! Driving ports for favoriting concerts and listing favorites.
//!
//! HTTP handlers call these with an already validated [`ConcertId`]; the
//! service decides between created, already-favorited and the error cases.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ConcertId, Error, FavoriteOutcome, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoritesCommand: Send + Sync {
    /// Record interest in `concert`, creating the concert row on first use.
    async fn favorite(&self, user: &UserId, concert: &ConcertId) -> Result<FavoriteOutcome, Error>;

    /// Drop interest in `concert`. Unknown concerts and absent links fail.
    async fn unfavorite(&self, user: &UserId, concert: &ConcertId) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoritesQuery: Send + Sync {
    /// Favorited ids, oldest favorite first.
    async fn favorite_ids(&self, user: &UserId) -> Result<Vec<ConcertId>, Error>;

    /// Upstream event payloads for every favorite still listed upstream.
    async fn favorite_events(&self, user: &UserId) -> Result<Vec<Value>, Error>;
}
