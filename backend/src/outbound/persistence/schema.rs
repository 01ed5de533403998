//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered members.
    users (id) {
        id -> Uuid,
        /// Unique public handle.
        username -> Varchar,
        email -> Varchar,
        /// bcrypt modular crypt string (`$2b$<cost>$...`).
        password_digest -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One-to-one display profile, created with the user.
    user_profiles (user_id) {
        user_id -> Uuid,
        profile_photo -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        term -> Varchar,
        faculty -> Varchar,
        favorite_artists -> Array<Text>,
        favorite_genres -> Array<Text>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Concerts known locally, keyed by the provider's event id.
    concerts (id) {
        id -> Int8,
        /// External event id; unique.
        concert_id -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Member/concert favorite links; unique per pair.
    favorite_concerts (id) {
        id -> Int8,
        user_id -> Uuid,
        concert_row_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed matching records; unique per `(user_id, target_id)`.
    matchings (id) {
        id -> Uuid,
        user_id -> Uuid,
        target_id -> Uuid,
        /// `YES`, `NO` or `UNKNOWN`.
        decision -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Concerts shared when a matching was last refreshed.
    matching_concerts (matching_id, concert_row_id) {
        matching_id -> Uuid,
        concert_row_id -> Int8,
        position -> Int2,
    }
}

diesel::joinable!(user_profiles -> users (user_id));
diesel::joinable!(favorite_concerts -> concerts (concert_row_id));
diesel::joinable!(matching_concerts -> concerts (concert_row_id));
diesel::joinable!(matching_concerts -> matchings (matching_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    user_profiles,
    concerts,
    favorite_concerts,
    matchings,
    matching_concerts,
);
