//! PostgreSQL-backed `ConcertRepository` implementation.
//!
//! Concert rows are get-or-create via `ON CONFLICT DO NOTHING` on the unique
//! external id, so concurrent favorites of a new concert converge on one row.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{ConcertRepository, ConcertRepositoryError, MemberFavorites};
use crate::domain::{ConcertId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewConcertRow, NewFavoriteRow};
use super::pool::{DbPool, PoolError};
use super::schema::{concerts, favorite_concerts};

/// Diesel-backed implementation of the `ConcertRepository` port.
#[derive(Clone)]
pub struct DieselConcertRepository {
    pool: DbPool,
}

impl DieselConcertRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ConcertRepositoryError {
    map_basic_pool_error(error, ConcertRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ConcertRepositoryError {
    map_basic_diesel_error(
        error,
        ConcertRepositoryError::query,
        ConcertRepositoryError::connection,
    )
}

/// Convert stored ids, dropping any that no longer validate.
pub(super) fn to_concert_ids(raw: Vec<String>) -> Vec<ConcertId> {
    raw.into_iter()
        .filter_map(|id| match ConcertId::new(&id) {
            Ok(concert) => Some(concert),
            Err(err) => {
                warn!(concert = %id, error = %err, "skipping invalid stored concert id");
                None
            }
        })
        .collect()
}

/// Fold `(user, concert)` rows ordered by user into one entry per user.
fn group_by_member(rows: Vec<(Uuid, String)>) -> Vec<MemberFavorites> {
    let mut grouped: Vec<MemberFavorites> = Vec::new();
    for (user, concert) in rows {
        let Ok(concert) = ConcertId::new(&concert) else {
            warn!(%concert, "skipping invalid stored concert id");
            continue;
        };
        let user_id = UserId::from_uuid(user);
        match grouped.last_mut() {
            Some(entry) if entry.user_id == user_id => entry.concerts.push(concert),
            _ => grouped.push(MemberFavorites {
                user_id,
                concerts: vec![concert],
            }),
        }
    }
    grouped
}

#[async_trait]
impl ConcertRepository for DieselConcertRepository {
    async fn ensure_concert(&self, concert: &ConcertId) -> Result<(), ConcertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(concerts::table)
            .values(&NewConcertRow {
                concert_id: concert.as_str(),
            })
            .on_conflict(concerts::concert_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn concert_exists(&self, concert: &ConcertId) -> Result<bool, ConcertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            concerts::table.filter(concerts::concert_id.eq(concert.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn add_favorite(
        &self,
        user: &UserId,
        concert: &ConcertId,
    ) -> Result<bool, ConcertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let concert_row_id: i64 = concerts::table
            .filter(concerts::concert_id.eq(concert.as_str()))
            .select(concerts::id)
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let inserted = diesel::insert_into(favorite_concerts::table)
            .values(&NewFavoriteRow {
                user_id: *user.as_uuid(),
                concert_row_id,
            })
            .on_conflict((favorite_concerts::user_id, favorite_concerts::concert_row_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn remove_favorite(
        &self,
        user: &UserId,
        concert: &ConcertId,
    ) -> Result<bool, ConcertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let concert_rows = concerts::table
            .filter(concerts::concert_id.eq(concert.as_str()))
            .select(concerts::id);
        let deleted = diesel::delete(
            favorite_concerts::table
                .filter(favorite_concerts::user_id.eq(user.as_uuid()))
                .filter(favorite_concerts::concert_row_id.eq_any(concert_rows)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn favorites_of(&self, user: &UserId) -> Result<Vec<ConcertId>, ConcertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<String> = favorite_concerts::table
            .inner_join(concerts::table)
            .filter(favorite_concerts::user_id.eq(user.as_uuid()))
            .order((favorite_concerts::created_at.asc(), favorite_concerts::id.asc()))
            .select(concerts::concert_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_concert_ids(rows))
    }

    async fn favorites_of_others(
        &self,
        excluded: &UserId,
    ) -> Result<Vec<MemberFavorites>, ConcertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(Uuid, String)> = favorite_concerts::table
            .inner_join(concerts::table)
            .filter(favorite_concerts::user_id.ne(excluded.as_uuid()))
            .order((
                favorite_concerts::user_id.asc(),
                favorite_concerts::created_at.asc(),
                favorite_concerts::id.asc(),
            ))
            .select((favorite_concerts::user_id, concerts::concert_id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(group_by_member(rows))
    }
}
