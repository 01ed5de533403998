//! PostgreSQL-backed `MatchingRepository` implementation.
//!
//! Pending records are refreshed inside a transaction that locks the
//! `(user, target)` row, so a concurrent review cannot interleave with the
//! concert replacement. Deleting an accepted pair is a single statement;
//! `matching_concerts` rows go with it through `ON DELETE CASCADE`.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{MatchingRepository, MatchingRepositoryError};
use crate::domain::{ConcertId, Decision, Matching, MatchingId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{MatchingRow, NewMatchingConcertRow, NewMatchingRow};
use super::pool::{DbPool, PoolError};
use super::schema::{concerts, matching_concerts, matchings};

/// Diesel-backed implementation of the `MatchingRepository` port.
#[derive(Clone)]
pub struct DieselMatchingRepository {
    pool: DbPool,
}

impl DieselMatchingRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MatchingRepositoryError {
    map_basic_pool_error(error, MatchingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MatchingRepositoryError {
    map_basic_diesel_error(
        error,
        MatchingRepositoryError::query,
        MatchingRepositoryError::connection,
    )
}

fn parse_decision(raw: &str, matching: Uuid) -> Decision {
    raw.parse().unwrap_or_else(|_| {
        warn!(%matching, value = raw, "unrecognised decision, treating as UNKNOWN");
        Decision::Unknown
    })
}

fn to_matching(row: MatchingRow, concerts: Vec<ConcertId>) -> Matching {
    Matching {
        id: MatchingId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        target_id: UserId::from_uuid(row.target_id),
        decision: parse_decision(&row.decision, row.id),
        matched_concerts: concerts,
    }
}

/// Load matched concerts for `ids`, keyed by matching id, in stored order.
async fn load_concerts(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<ConcertId>>, diesel::result::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, String)> = matching_concerts::table
        .inner_join(concerts::table)
        .filter(matching_concerts::matching_id.eq_any(ids))
        .order((matching_concerts::matching_id, matching_concerts::position))
        .select((matching_concerts::matching_id, concerts::concert_id))
        .load(conn)
        .await?;

    let mut by_matching: HashMap<Uuid, Vec<ConcertId>> = HashMap::new();
    for (matching, concert) in rows {
        match ConcertId::new(&concert) {
            Ok(id) => by_matching.entry(matching).or_default().push(id),
            Err(err) => warn!(%matching, %concert, error = %err, "skipping invalid stored concert id"),
        }
    }
    Ok(by_matching)
}

async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<MatchingRow>,
) -> Result<Vec<Matching>, diesel::result::Error> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut concerts = load_concerts(conn, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let linked = concerts.remove(&row.id).unwrap_or_default();
            to_matching(row, linked)
        })
        .collect())
}

/// Rebuild the concert links of `matching` to exactly `wanted`, in order.
async fn replace_concerts(
    conn: &mut AsyncPgConnection,
    matching: Uuid,
    wanted: &[ConcertId],
) -> Result<Vec<ConcertId>, diesel::result::Error> {
    diesel::delete(matching_concerts::table.filter(matching_concerts::matching_id.eq(matching)))
        .execute(conn)
        .await?;

    let raw: Vec<&str> = wanted.iter().map(ConcertId::as_str).collect();
    let known: HashMap<String, i64> = concerts::table
        .filter(concerts::concert_id.eq_any(raw))
        .select((concerts::concert_id, concerts::id))
        .load::<(String, i64)>(conn)
        .await?
        .into_iter()
        .collect();

    let mut linked = Vec::with_capacity(wanted.len());
    let mut rows = Vec::with_capacity(wanted.len());
    for concert in wanted {
        let Some(row_id) = known.get(concert.as_str()) else {
            warn!(%matching, %concert, "shared concert has no local row");
            continue;
        };
        rows.push(NewMatchingConcertRow {
            matching_id: matching,
            concert_row_id: *row_id,
            position: i16::try_from(rows.len()).unwrap_or(i16::MAX),
        });
        linked.push(concert.clone());
    }
    if !rows.is_empty() {
        diesel::insert_into(matching_concerts::table)
            .values(&rows)
            .execute(conn)
            .await?;
    }
    Ok(linked)
}

#[async_trait]
impl MatchingRepository for DieselMatchingRepository {
    async fn find_pair(
        &self,
        user: &UserId,
        target: &UserId,
    ) -> Result<Option<Matching>, MatchingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MatchingRow> = matchings::table
            .filter(matchings::user_id.eq(user.as_uuid()))
            .filter(matchings::target_id.eq(target.as_uuid()))
            .select(MatchingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut found = hydrate(&mut conn, vec![row])
            .await
            .map_err(map_diesel_error)?;
        Ok(found.pop())
    }

    async fn upsert_pending(
        &self,
        user: &UserId,
        target: &UserId,
        concerts: &[ConcertId],
    ) -> Result<Option<Matching>, MatchingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = *user.as_uuid();
        let target = *target.as_uuid();

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(matchings::table)
                    .values(&NewMatchingRow {
                        id: Uuid::new_v4(),
                        user_id: user,
                        target_id: target,
                        decision: Decision::Unknown.as_str(),
                    })
                    .on_conflict((matchings::user_id, matchings::target_id))
                    .do_nothing()
                    .execute(conn)
                    .await?;

                let row: MatchingRow = matchings::table
                    .filter(matchings::user_id.eq(user))
                    .filter(matchings::target_id.eq(target))
                    .select(MatchingRow::as_select())
                    .for_update()
                    .first(conn)
                    .await?;
                if parse_decision(&row.decision, row.id).is_decided() {
                    return Ok(None);
                }

                let linked = replace_concerts(conn, row.id, concerts).await?;
                Ok(Some(to_matching(row, linked)))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &MatchingId,
    ) -> Result<Option<Matching>, MatchingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MatchingRow> = matchings::table
            .find(id.as_uuid())
            .select(MatchingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut found = hydrate(&mut conn, vec![row])
            .await
            .map_err(map_diesel_error)?;
        Ok(found.pop())
    }

    async fn record_decision(
        &self,
        id: &MatchingId,
        owner: &UserId,
        decision: Decision,
    ) -> Result<bool, MatchingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            matchings::table
                .filter(matchings::id.eq(id.as_uuid()))
                .filter(matchings::user_id.eq(owner.as_uuid()))
                .filter(matchings::decision.eq(Decision::Unknown.as_str())),
        )
        .set((
            matchings::decision.eq(decision.as_str()),
            matchings::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }

    async fn accepted_by(&self, user: &UserId) -> Result<Vec<Matching>, MatchingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MatchingRow> = matchings::table
            .filter(matchings::user_id.eq(user.as_uuid()))
            .filter(matchings::decision.eq(Decision::Yes.as_str()))
            .order(matchings::updated_at.asc())
            .select(MatchingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await.map_err(map_diesel_error)
    }

    async fn delete_accepted_pair(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<usize, MatchingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let forward = matchings::user_id
            .eq(*a.as_uuid())
            .and(matchings::target_id.eq(*b.as_uuid()));
        let backward = matchings::user_id
            .eq(*b.as_uuid())
            .and(matchings::target_id.eq(*a.as_uuid()));
        diesel::delete(
            matchings::table
                .filter(matchings::decision.eq(Decision::Yes.as_str()))
                .filter(forward.or(backward)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(decision: &str) -> MatchingRow {
        MatchingRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            target_id: Uuid::new_v4(),
            decision: decision.to_owned(),
        }
    }

    #[rstest]
    #[case("YES", Decision::Yes)]
    #[case("NO", Decision::No)]
    #[case("UNKNOWN", Decision::Unknown)]
    #[case("garbage", Decision::Unknown)]
    fn stored_decisions_are_parsed(#[case] raw: &str, #[case] expected: Decision) {
        let matching = to_matching(row(raw), Vec::new());
        assert_eq!(matching.decision, expected);
    }

    #[rstest]
    fn row_ids_carry_over() {
        let source = row("YES");
        let matching = to_matching(source.clone(), vec![ConcertId::new("9").expect("id")]);
        assert_eq!(matching.id.as_uuid(), &source.id);
        assert_eq!(matching.user_id.as_uuid(), &source.user_id);
        assert_eq!(matching.target_id.as_uuid(), &source.target_id);
        assert_eq!(matching.matched_concerts.len(), 1);
    }
}
