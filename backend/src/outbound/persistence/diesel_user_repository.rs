//! PostgreSQL-backed `UserRepository` implementation.
//!
//! A user row and its profile row are always inserted in one transaction;
//! there is no trigger or follow-up hook creating profiles later.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{NewAccount, StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{Account, EmailAddress, Member, UserId, UserProfile, Username};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewProfileRow, NewUserRow, ProfileRow, ProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{user_profiles, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn profile_update(profile: &UserProfile) -> ProfileUpdate<'_> {
    ProfileUpdate {
        profile_photo: &profile.profile_photo,
        first_name: &profile.first_name,
        last_name: &profile.last_name,
        term: &profile.term,
        faculty: &profile.faculty,
        favorite_artists: &profile.favorite_artists,
        favorite_genres: &profile.favorite_genres,
    }
}

fn to_profile(row: ProfileRow) -> UserProfile {
    UserProfile {
        profile_photo: row.profile_photo,
        first_name: row.first_name,
        last_name: row.last_name,
        term: row.term,
        faculty: row.faculty,
        favorite_artists: row.favorite_artists,
        favorite_genres: row.favorite_genres,
    }
}

fn to_member(user: &UserRow, profile: ProfileRow) -> Result<Member, UserPersistenceError> {
    let username = Username::new(user.username.clone()).map_err(|err| {
        warn!(user = %user.id, error = %err, "stored username fails validation");
        UserPersistenceError::query("stored username is invalid")
    })?;
    Ok(Member {
        id: UserId::from_uuid(user.id),
        username,
        profile: to_profile(profile),
    })
}

fn to_account(user: UserRow, profile: ProfileRow) -> Result<Account, UserPersistenceError> {
    let member = to_member(&user, profile)?;
    let email = EmailAddress::new(user.email).map_err(|err| {
        warn!(user = %member.id, error = %err, "stored email fails validation");
        UserPersistenceError::query("stored email is invalid")
    })?;
    Ok(Account { member, email })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create_with_profile(&self, account: &NewAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_row = NewUserRow {
            id: *account.id.as_uuid(),
            username: account.username.as_str(),
            email: account.email.as_str(),
            password_digest: &account.password_digest,
        };
        let profile_row = NewProfileRow {
            user_id: *account.id.as_uuid(),
            fields: profile_update(&account.profile),
        };

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&user_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(user_profiles::table)
                    .values(&profile_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err: diesel::result::Error| {
            if is_unique_violation(&err) {
                UserPersistenceError::duplicate_username(account.username.as_str())
            } else {
                map_diesel_error(err)
            }
        })
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(uuid::Uuid, String)> = users::table
            .filter(users::username.eq(username))
            .select((users::id, users::password_digest))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|(id, password_digest)| StoredCredentials {
            user_id: UserId::from_uuid(id),
            password_digest,
        }))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Member>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(UserRow, ProfileRow)> = users::table
            .inner_join(user_profiles::table)
            .filter(users::username.eq(username))
            .select((UserRow::as_select(), ProfileRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(user, profile)| to_member(&user, profile))
            .transpose()
    }

    async fn find_account(&self, id: &UserId) -> Result<Option<Account>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(UserRow, ProfileRow)> = users::table
            .inner_join(user_profiles::table)
            .filter(users::id.eq(id.as_uuid()))
            .select((UserRow::as_select(), ProfileRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(user, profile)| to_account(user, profile))
            .transpose()
    }

    async fn members(&self, ids: &[UserId]) -> Result<Vec<Member>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<(UserRow, ProfileRow)> = users::table
            .inner_join(user_profiles::table)
            .filter(users::id.eq_any(uuids))
            .select((UserRow::as_select(), ProfileRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(user, profile)| to_member(&user, profile))
            .collect()
    }

    async fn save_profile(
        &self,
        id: &UserId,
        profile: &UserProfile,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(user_profiles::table.find(id.as_uuid()))
            .set((
                profile_update(profile),
                user_profiles::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
