//! Cookie-session settings read from the environment.
//!
//! Debug builds fall back to permissive defaults with a warning. Release
//! builds reject anything missing or malformed so a misconfigured deployment
//! fails at startup instead of issuing weak cookies.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_DEFAULT_PATH: &str = "/run/secrets/encore_session_key";
pub const SESSION_KEY_MIN_LEN: usize = 64;
pub const KEY_FILE_ENV: &str = "ENCORE_SESSION_KEY_FILE";
pub const COOKIE_SECURE_ENV: &str = "ENCORE_SESSION_COOKIE_SECURE";
pub const SAMESITE_ENV: &str = "ENCORE_SESSION_SAMESITE";
pub const ALLOW_EPHEMERAL_ENV: &str = "ENCORE_SESSION_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const FINGERPRINT_BYTES: usize = 8;

/// Which validation rules apply.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Pick the mode matching `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated session settings.
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("ENCORE_SESSION_SAMESITE=None needs ENCORE_SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("ENCORE_SESSION_ALLOW_EPHEMERAL is debug-only")]
    EphemeralNotAllowed,
}

/// Build session settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use encore::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let reader = EnvReader { env, mode };
    let cookie_secure = reader.flag(COOKIE_SECURE_ENV, true)?;
    let same_site = reader.same_site(cookie_secure)?;
    let allow_ephemeral = reader.flag(ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    Ok(SessionSettings {
        key: reader.key(allow_ephemeral)?,
        cookie_secure,
        same_site,
    })
}

/// Short hex fingerprint of the signing key, safe to log.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

struct EnvReader<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> EnvReader<'_, E> {
    /// Debug builds log `problem` and carry on with `fallback`.
    fn tolerate<T>(&self, fallback: T, problem: SessionConfigError) -> Result<T, SessionConfigError> {
        match self.mode {
            BuildMode::Debug => {
                warn!(error = %problem, "session setting fallback (debug build)");
                Ok(fallback)
            }
            BuildMode::Release => Err(problem),
        }
    }

    fn flag(&self, name: &'static str, fallback: bool) -> Result<bool, SessionConfigError> {
        let Some(raw) = self.env.string(name) else {
            return self.tolerate(fallback, SessionConfigError::MissingEnv { name });
        };
        let parsed = match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" => Some(true),
            "0" | "false" | "no" | "n" => Some(false),
            _ => None,
        };
        match parsed {
            Some(flag) => Ok(flag),
            None => self.tolerate(
                fallback,
                SessionConfigError::InvalidEnv {
                    name,
                    value: raw,
                    expected: BOOL_EXPECTED,
                },
            ),
        }
    }

    fn same_site(&self, cookie_secure: bool) -> Result<SameSite, SessionConfigError> {
        let fallback = match self.mode {
            BuildMode::Debug => SameSite::Lax,
            BuildMode::Release => SameSite::Strict,
        };
        let Some(raw) = self.env.string(SAMESITE_ENV) else {
            return self.tolerate(fallback, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
        };
        let lowered = raw.to_ascii_lowercase();
        match (lowered.as_str(), cookie_secure) {
            ("strict", _) => Ok(SameSite::Strict),
            ("lax", _) => Ok(SameSite::Lax),
            ("none", true) => Ok(SameSite::None),
            ("none", false) => self.tolerate(SameSite::None, SessionConfigError::InsecureSameSiteNone),
            _ => self.tolerate(
                fallback,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value: raw,
                    expected: SAMESITE_EXPECTED,
                },
            ),
        }
    }

    fn key(&self, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
        let path: PathBuf = self
            .env
            .string(KEY_FILE_ENV)
            .map_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH), PathBuf::from);
        let mut bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) if self.mode == BuildMode::Debug || allow_ephemeral => {
                warn!(path = %path.display(), error = %source, "generating throwaway session key");
                return Ok(Key::generate());
            }
            Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
        };
        let length = bytes.len();
        let outcome = if self.mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
            Err(SessionConfigError::KeyTooShort {
                path,
                length,
                min_len: SESSION_KEY_MIN_LEN,
            })
        } else {
            Ok(Key::derive_from(&bytes))
        };
        bytes.zeroize();
        outcome
    }
}
