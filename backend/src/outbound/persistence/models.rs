//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; repositories translate them to
//! domain types.

use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{concerts, favorite_concerts, matching_concerts, matchings, user_profiles, users};

/// Columns of `users` read alongside a profile.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_digest: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub profile_photo: String,
    pub first_name: String,
    pub last_name: String,
    pub term: String,
    pub faculty: String,
    pub favorite_artists: Vec<String>,
    pub favorite_genres: Vec<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub user_id: Uuid,
    #[diesel(embed)]
    pub fields: ProfileUpdate<'a>,
}

/// Full overwrite of the editable profile columns.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = user_profiles)]
pub(crate) struct ProfileUpdate<'a> {
    pub profile_photo: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub term: &'a str,
    pub faculty: &'a str,
    pub favorite_artists: &'a [String],
    pub favorite_genres: &'a [String],
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = concerts)]
pub(crate) struct NewConcertRow<'a> {
    pub concert_id: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = favorite_concerts)]
pub(crate) struct NewFavoriteRow {
    pub user_id: Uuid,
    pub concert_row_id: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = matchings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MatchingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_id: Uuid,
    pub decision: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = matchings)]
pub(crate) struct NewMatchingRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_id: Uuid,
    pub decision: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = matching_concerts)]
pub(crate) struct NewMatchingConcertRow {
    pub matching_id: Uuid,
    pub concert_row_id: i64,
    pub position: i16,
}
