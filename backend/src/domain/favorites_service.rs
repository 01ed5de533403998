//! Favoriting service.
//!
//! Implements [`FavoritesCommand`] and [`FavoritesQuery`] over the concert
//! repository and the ticketing event source.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::repository_errors::{map_concert_error, map_event_source_error};
use crate::domain::ports::{
    ConcertRepository, ConcertRepositoryError, EventQuery, EventSource, FavoritesCommand,
    FavoritesQuery,
};
use crate::domain::{ConcertId, Error, FavoriteError, FavoriteOutcome, UserId};

/// Remove one favorite link, distinguishing request-level rejections from
/// repository failures.
///
/// The outer `Result` carries repository failures; the inner one reports
/// an unknown concert or a missing link.
pub(crate) async fn unlink_favorite<C>(
    concerts: &C,
    user: &UserId,
    concert: &ConcertId,
) -> Result<Result<(), FavoriteError>, ConcertRepositoryError>
where
    C: ConcertRepository + ?Sized,
{
    if !concerts.concert_exists(concert).await? {
        return Ok(Err(FavoriteError::ConcertNotFound(concert.clone())));
    }
    if !concerts.remove_favorite(user, concert).await? {
        return Ok(Err(FavoriteError::NotFavorited(concert.clone())));
    }
    Ok(Ok(()))
}

/// Favorites service implementing the driving ports.
#[derive(Clone)]
pub struct FavoritesService<C, E> {
    concerts: Arc<C>,
    events: Arc<E>,
}

impl<C, E> FavoritesService<C, E> {
    pub fn new(concerts: Arc<C>, events: Arc<E>) -> Self {
        Self { concerts, events }
    }
}

#[async_trait]
impl<C, E> FavoritesCommand for FavoritesService<C, E>
where
    C: ConcertRepository,
    E: EventSource,
{
    async fn favorite(&self, user: &UserId, concert: &ConcertId) -> Result<FavoriteOutcome, Error> {
        self.concerts
            .ensure_concert(concert)
            .await
            .map_err(map_concert_error)?;
        let created = self
            .concerts
            .add_favorite(user, concert)
            .await
            .map_err(map_concert_error)?;
        Ok(if created {
            FavoriteOutcome::Created
        } else {
            FavoriteOutcome::AlreadyFavorited
        })
    }

    async fn unfavorite(&self, user: &UserId, concert: &ConcertId) -> Result<(), Error> {
        unlink_favorite(self.concerts.as_ref(), user, concert)
            .await
            .map_err(map_concert_error)?
            .map_err(Error::from)
    }
}

#[async_trait]
impl<C, E> FavoritesQuery for FavoritesService<C, E>
where
    C: ConcertRepository,
    E: EventSource,
{
    async fn favorite_ids(&self, user: &UserId) -> Result<Vec<ConcertId>, Error> {
        self.concerts
            .favorites_of(user)
            .await
            .map_err(map_concert_error)
    }

    async fn favorite_events(&self, user: &UserId) -> Result<Vec<Value>, Error> {
        let ids = self.favorite_ids(user).await?;
        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            let page = self
                .events
                .search(&EventQuery::by_id(id.clone()))
                .await
                .map_err(map_event_source_error)?;
            match page.events.into_iter().next() {
                Some(event) if page.total_count > 0 => events.push(event),
                _ => debug!(concert = %id, "favorited concert no longer listed upstream"),
            }
        }
        Ok(events)
    }
}
