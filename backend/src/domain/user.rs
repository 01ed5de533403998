//! Member identity types.
//!
//! A member is a registered identity with a unique username and an attached
//! [`UserProfile`]. Matching and favoriting only ever reference members by
//! [`UserId`]; the username is the public handle used by `delete_match`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserProfile;

/// Upper bound on username length.
pub const USERNAME_MAX: usize = 150;

/// Validation failures for identity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("username must be 3-{max} characters of letters, digits or @.+-_", max = USERNAME_MAX)]
    InvalidUsername,
    #[error("email address must contain a single @ with text on both sides")]
    InvalidEmail,
}

/// Stable member identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its textual UUID form.
    ///
    /// # Examples
    /// ```
    /// use encore::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// assert!(UserId::new("nope").is_err());
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.@+\-]{3,150}$")
            .unwrap_or_else(|err| panic!("username regex must compile: {err}"))
    })
}

/// Public, unique handle of a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    ///
    /// # Examples
    /// ```
    /// use encore::domain::Username;
    ///
    /// assert!(Username::new("ada.l").is_ok());
    /// assert!(Username::new("a b").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if !username_regex().is_match(&raw) {
            return Err(UserValidationError::InvalidUsername);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Contact address captured at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into().trim().to_owned();
        let mut parts = raw.split('@');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None)
                if !local.is_empty() && !domain.is_empty() && !raw.contains(char::is_whitespace)
        );
        if !valid {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// A member as other members see them: identity plus display profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: UserId,
    pub username: Username,
    pub profile: UserProfile,
}

/// The signed-in member's own view, including private contact details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub member: Member,
    pub email: EmailAddress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc", true)]
    #[case("user_name.with+chars@x-y", true)]
    #[case("ab", false)]
    #[case("has space", false)]
    #[case("emoji🎵", false)]
    fn username_validation(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(Username::new(raw).is_ok(), ok);
    }

    #[rstest]
    fn username_length_cap() {
        assert!(Username::new("a".repeat(USERNAME_MAX)).is_ok());
        assert_eq!(
            Username::new("a".repeat(USERNAME_MAX + 1)),
            Err(UserValidationError::InvalidUsername)
        );
    }

    #[rstest]
    #[case("fan@uwaterloo.ca", true)]
    #[case("  fan@example.com ", true)]
    #[case("no-at-sign", false)]
    #[case("@example.com", false)]
    #[case("fan@", false)]
    #[case("a@b@c", false)]
    #[case("a b@c", false)]
    fn email_validation(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(EmailAddress::new(raw).is_ok(), ok);
    }

    #[rstest]
    #[case("")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    #[case("not-a-uuid")]
    fn user_id_rejects_malformed_input(#[case] raw: &str) {
        assert_eq!(UserId::new(raw), Err(UserValidationError::InvalidId));
    }

    #[rstest]
    fn user_id_serialises_as_plain_string() {
        let id = UserId::random();
        let json = serde_json::to_value(id).expect("serialise");
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }
}
