//! Member display profile and its validated update patch.
//!
//! Profiles never influence matching; they only enrich candidate and match
//! listings. Updates arrive as a [`ProfilePatch`] in which every field is
//! optional and validated independently against fixed allow-lists.

use std::sync::OnceLock;

use regex::Regex;

/// Avatar assigned to every new profile.
pub const DEFAULT_AVATAR: &str = "/avatars/1.jpg";

/// Avatars a member may pick from.
pub const ALLOWED_AVATARS: [&str; 4] = [
    "/avatars/1.jpg",
    "/avatars/2.jpg",
    "/avatars/3.jpg",
    "/avatars/4.jpg",
];

/// Academic terms accepted on a profile.
pub const ALLOWED_TERMS: [&str; 14] = [
    "1A",
    "1B",
    "2A",
    "2B",
    "3A",
    "3B",
    "4A",
    "4B",
    "Masters",
    "Graduate",
    "PhD",
    "Undergraduate",
    "Exchange Student",
    "Prefer not to say",
];

/// Faculties accepted on a profile.
pub const ALLOWED_FACULTIES: [&str; 6] = [
    "Arts",
    "Engineering",
    "Environment",
    "Health",
    "Mathematics",
    "Science",
];

/// Maximum number of favourite artists or genres.
pub const MAX_FAVOURITES: usize = 3;

const GENRE_MAX_CHARS: usize = 30;

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9\s&'\-]{0,50}$")
            .unwrap_or_else(|err| panic!("name regex must compile: {err}"))
    })
}

/// Display attributes attached one-to-one to a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub profile_photo: String,
    pub first_name: String,
    pub last_name: String,
    pub term: String,
    pub faculty: String,
    pub favorite_artists: Vec<String>,
    pub favorite_genres: Vec<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            profile_photo: DEFAULT_AVATAR.to_owned(),
            first_name: String::new(),
            last_name: String::new(),
            term: String::new(),
            faculty: String::new(),
            favorite_artists: Vec::new(),
            favorite_genres: Vec::new(),
        }
    }
}

impl UserProfile {
    /// First and last name joined, skipping blanks.
    ///
    /// # Examples
    /// ```
    /// use encore::domain::UserProfile;
    ///
    /// let mut profile = UserProfile::default();
    /// profile.first_name = "Ada".into();
    /// assert_eq!(profile.display_name(), "Ada");
    /// profile.last_name = "Lovelace".into();
    /// assert_eq!(profile.display_name(), "Ada Lovelace");
    /// ```
    pub fn display_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Apply an already validated patch.
    pub fn apply(&mut self, patch: ValidProfilePatch) {
        let ValidProfilePatch(patch) = patch;
        if let Some(photo) = patch.profile_photo {
            self.profile_photo = photo;
        }
        if let Some(first) = patch.first_name {
            self.first_name = first;
        }
        if let Some(last) = patch.last_name {
            self.last_name = last;
        }
        if let Some(term) = patch.term {
            self.term = term;
        }
        if let Some(faculty) = patch.faculty {
            self.faculty = faculty;
        }
        if let Some(artists) = patch.favorite_artists {
            self.favorite_artists = artists;
        }
        if let Some(genres) = patch.favorite_genres {
            self.favorite_genres = genres;
        }
    }
}

/// Profile field named in validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    ProfilePhoto,
    FirstName,
    LastName,
    Term,
    Faculty,
    FavoriteArtists,
    FavoriteGenres,
}

impl ProfileField {
    /// Wire name of the field as clients send it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProfilePhoto => "profilePhoto",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Term => "term",
            Self::Faculty => "faculty",
            Self::FavoriteArtists => "favoriteArtists",
            Self::FavoriteGenres => "favoriteGenres",
        }
    }
}

/// A rejected profile update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("invalid avatar selection")]
    InvalidAvatar,
    #[error("{} contains invalid characters", .0.as_str())]
    InvalidCharacters(ProfileField),
    #[error("invalid term selection")]
    InvalidTerm,
    #[error("invalid faculty selection")]
    InvalidFaculty,
    #[error("{} accepts at most {max} entries", .field.as_str())]
    TooMany { field: ProfileField, max: usize },
    #[error("{} entries must not be blank", .0.as_str())]
    BlankEntry(ProfileField),
}

impl ProfileValidationError {
    /// The field that failed validation.
    pub fn field(&self) -> ProfileField {
        match self {
            Self::InvalidAvatar => ProfileField::ProfilePhoto,
            Self::InvalidTerm => ProfileField::Term,
            Self::InvalidFaculty => ProfileField::Faculty,
            Self::InvalidCharacters(field) | Self::BlankEntry(field) => *field,
            Self::TooMany { field, .. } => *field,
        }
    }
}

/// Requested profile changes; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub profile_photo: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub term: Option<String>,
    pub faculty: Option<String>,
    pub favorite_artists: Option<Vec<String>>,
    pub favorite_genres: Option<Vec<String>>,
}

/// A [`ProfilePatch`] whose fields have been normalised and checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfilePatch(ProfilePatch);

impl ProfilePatch {
    /// Validate every present field, trimming names and capping genre length.
    ///
    /// # Examples
    /// ```
    /// use encore::domain::{ProfileField, ProfilePatch};
    ///
    /// let patch = ProfilePatch {
    ///     faculty: Some("Basket Weaving".into()),
    ///     ..ProfilePatch::default()
    /// };
    /// let err = patch.validate().unwrap_err();
    /// assert_eq!(err.field(), ProfileField::Faculty);
    /// ```
    pub fn validate(self) -> Result<ValidProfilePatch, ProfileValidationError> {
        if self
            .profile_photo
            .as_deref()
            .is_some_and(|value| !ALLOWED_AVATARS.contains(&value))
        {
            return Err(ProfileValidationError::InvalidAvatar);
        }
        let first_name = self
            .first_name
            .map(|name| checked_name(&name, ProfileField::FirstName))
            .transpose()?;
        let last_name = self
            .last_name
            .map(|name| checked_name(&name, ProfileField::LastName))
            .transpose()?;
        if self
            .term
            .as_deref()
            .is_some_and(|value| !ALLOWED_TERMS.contains(&value))
        {
            return Err(ProfileValidationError::InvalidTerm);
        }
        if self
            .faculty
            .as_deref()
            .is_some_and(|value| !ALLOWED_FACULTIES.contains(&value))
        {
            return Err(ProfileValidationError::InvalidFaculty);
        }
        let favorite_artists = self
            .favorite_artists
            .map(|names| checked_list(names, ProfileField::FavoriteArtists, None))
            .transpose()?;
        let favorite_genres = self
            .favorite_genres
            .map(|names| checked_list(names, ProfileField::FavoriteGenres, Some(GENRE_MAX_CHARS)))
            .transpose()?;

        Ok(ValidProfilePatch(Self {
            profile_photo: self.profile_photo,
            first_name,
            last_name,
            term: self.term,
            faculty: self.faculty,
            favorite_artists,
            favorite_genres,
        }))
    }
}

fn checked_name(raw: &str, field: ProfileField) -> Result<String, ProfileValidationError> {
    let trimmed = raw.trim();
    if !name_regex().is_match(trimmed) {
        return Err(ProfileValidationError::InvalidCharacters(field));
    }
    Ok(trimmed.to_owned())
}

fn checked_list(
    names: Vec<String>,
    field: ProfileField,
    max_chars: Option<usize>,
) -> Result<Vec<String>, ProfileValidationError> {
    if names.len() > MAX_FAVOURITES {
        return Err(ProfileValidationError::TooMany {
            field,
            max: MAX_FAVOURITES,
        });
    }
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = checked_name(&name, field)?;
        if name.is_empty() {
            return Err(ProfileValidationError::BlankEntry(field));
        }
        let name = match max_chars {
            Some(limit) => name.chars().take(limit).collect(),
            None => name,
        };
        if !out.contains(&name) {
            out.push(name);
        }
    }
    Ok(out)
}
