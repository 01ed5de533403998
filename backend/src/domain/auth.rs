//! Authentication primitives: login credentials, registration input and
//! stored password digests.
//!
//! Inbound adapters build these from raw strings so handlers never pass
//! unchecked input to a port or service.

use zeroize::Zeroizing;

use super::{EmailAddress, UserValidationError, Username};

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;

const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;

/// Login payload values were unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller whitespace.
///
/// # Examples
/// ```
/// use encore::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "hunter22").unwrap();
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Registration payload values were unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error(transparent)]
    Identity(#[from] UserValidationError),
    #[error("password must be at least {min} characters", min = PASSWORD_MIN_CHARS)]
    PasswordTooShort,
}

impl RegistrationValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Identity(UserValidationError::InvalidEmail) => "email",
            Self::Identity(_) => "username",
            Self::PasswordTooShort => "password",
        }
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Registration {
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username.trim())?;
        let email = EmailAddress::new(email)?;
        if password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(RegistrationValidationError::PasswordTooShort);
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Stored value is not a bcrypt hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed password digest")]
pub struct MalformedDigest;

/// Hashing or verification could not run to completion.
#[derive(Debug, thiserror::Error)]
pub enum PasswordHashError {
    #[error("bcrypt failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// bcrypt digest in modular crypt form (`$2b$<cost>$<salt+hash>`).
///
/// # Examples
/// ```
/// use encore::domain::PasswordHasher;
///
/// let digest = PasswordHasher::with_cost(4).hash_blocking("correct horse").unwrap();
/// assert!(digest.verify("correct horse").unwrap());
/// assert!(!digest.verify("wrong horse").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Accept a stored digest once bcrypt can split it into its parts.
    pub fn parse(encoded: &str) -> Result<Self, MalformedDigest> {
        encoded
            .parse::<bcrypt::HashParts>()
            .map_err(|_| MalformedDigest)?;
        Ok(Self(encoded.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Check `password` against the digest. Blocks for the digest's cost.
    pub fn verify(&self, password: &str) -> Result<bool, PasswordHashError> {
        Ok(bcrypt::verify(password, &self.0)?)
    }
}

/// bcrypt hashing with a fixed work factor, run on Tokio's blocking pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    /// Clamped to the range bcrypt accepts.
    #[must_use]
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(BCRYPT_MIN_COST, BCRYPT_MAX_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash on the calling thread.
    pub fn hash_blocking(&self, password: &str) -> Result<PasswordDigest, PasswordHashError> {
        Ok(PasswordDigest(bcrypt::hash(password, self.cost)?))
    }

    pub async fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password)).await?
    }

    pub async fn verify(
        &self,
        digest: &PasswordDigest,
        password: &str,
    ) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let digest = digest.clone();
        tokio::task::spawn_blocking(move || digest.verify(&password)).await?
    }

    /// Spend one verification's worth of work when no digest is stored, so
    /// an unknown username is rejected as slowly as a wrong password.
    pub async fn verify_absent(&self, password: &str) -> Result<(), PasswordHashError> {
        self.hash(password).await.map(drop)
    }
}
