//! Registration, login and profile services.
//!
//! Implements [`AccountCommand`], [`AccountQuery`] and [`LoginService`] over
//! the user repository. A member and its profile are always created
//! together.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::repository_errors::map_user_error;
use crate::domain::ports::{AccountCommand, AccountQuery, LoginService, NewAccount, UserRepository};
use crate::domain::{
    Account, Error, LoginCredentials, PasswordDigest, PasswordHashError, PasswordHasher,
    ProfilePatch, Registration, UserId, UserProfile,
};

/// Account service implementing the driving ports.
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: PasswordHasher,
}

impl<U> AccountService<U> {
    /// Service hashing at bcrypt's default cost.
    pub fn new(users: Arc<U>) -> Self {
        Self {
            users,
            hasher: PasswordHasher::default(),
        }
    }

    /// Replace the password hasher, e.g. with a cheaper cost in tests.
    #[must_use]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }
}

fn hashing_failed(err: PasswordHashError) -> Error {
    warn!(error = %err, "password hashing failed");
    Error::internal("password hashing failed")
}

impl<U> AccountService<U>
where
    U: UserRepository,
{
    async fn load_account(&self, user: &UserId) -> Result<Account, Error> {
        self.users
            .find_account(user)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("account not found"))
    }
}

#[async_trait]
impl<U> AccountCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: &Registration) -> Result<UserId, Error> {
        let digest = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(hashing_failed)?;
        let account = NewAccount {
            id: UserId::random(),
            username: registration.username().clone(),
            email: registration.email().clone(),
            password_digest: digest.into_string(),
            profile: UserProfile::default(),
        };
        self.users
            .create_with_profile(&account)
            .await
            .map_err(map_user_error)?;
        info!(user = %account.id, username = %account.username, "member registered");
        Ok(account.id)
    }

    async fn update_profile(&self, user: &UserId, patch: ProfilePatch) -> Result<Account, Error> {
        let valid = patch.validate().map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": err.field().as_str(), "code": "invalid_profile" }))
        })?;
        let mut account = self.load_account(user).await?;
        account.member.profile.apply(valid);
        let saved = self
            .users
            .save_profile(user, &account.member.profile)
            .await
            .map_err(map_user_error)?;
        if !saved {
            return Err(Error::not_found("account not found"));
        }
        Ok(account)
    }
}

#[async_trait]
impl<U> AccountQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn current_account(&self, user: &UserId) -> Result<Account, Error> {
        self.load_account(user).await
    }
}

#[async_trait]
impl<U> LoginService for AccountService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_user_error)?;
        let Some(stored) = stored else {
            self.hasher
                .verify_absent(credentials.password())
                .await
                .map_err(hashing_failed)?;
            return Err(Error::unauthorized("invalid credentials"));
        };
        let digest = PasswordDigest::parse(&stored.password_digest).map_err(|err| {
            warn!(user = %stored.user_id, error = %err, "stored password digest unreadable");
            Error::internal("stored credentials are unreadable")
        })?;
        let matches = self
            .hasher
            .verify(&digest, credentials.password())
            .await
            .map_err(hashing_failed)?;
        if matches {
            Ok(stored.user_id)
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockUserRepository, StoredCredentials, UserPersistenceError};
    use crate::domain::{
        DEFAULT_AVATAR, EmailAddress, ErrorCode, Member, ProfileField, Username,
    };
    use rstest::rstest;

    fn service(users: MockUserRepository) -> AccountService<MockUserRepository> {
        AccountService::new(Arc::new(users)).with_hasher(PasswordHasher::with_cost(4))
    }

    fn account(id: UserId) -> Account {
        Account {
            member: Member {
                id,
                username: Username::new("ada").expect("username"),
                profile: UserProfile::default(),
            },
            email: EmailAddress::new("ada@example.com").expect("email"),
        }
    }

    #[tokio::test]
    async fn register_creates_member_with_default_profile() {
        let mut users = MockUserRepository::new();
        users
            .expect_create_with_profile()
            .withf(|account| {
                account.username.as_str() == "ada"
                    && account.profile.profile_photo == DEFAULT_AVATAR
                    && PasswordDigest::parse(&account.password_digest)
                        .is_ok_and(|digest| digest.verify("longenough").unwrap_or(false))
            })
            .times(1)
            .return_once(|_| Ok(()));

        let registration = Registration::try_from_parts("ada", "ada@example.com", "longenough")
            .expect("valid registration");
        service(users)
            .register(&registration)
            .await
            .expect("registered");
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_create_with_profile()
            .return_once(|_| Err(UserPersistenceError::duplicate_username("ada")));

        let registration = Registration::try_from_parts("ada", "ada@example.com", "longenough")
            .expect("valid registration");
        let err = service(users)
            .register(&registration)
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case("right-password", true)]
    #[case("wrong-password", false)]
    #[tokio::test]
    async fn authenticate_checks_digest(#[case] password: &str, #[case] ok: bool) {
        let id = UserId::random();
        let digest = PasswordHasher::with_cost(4)
            .hash_blocking("right-password")
            .expect("hash")
            .into_string();
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(move |_| {
            Ok(Some(StoredCredentials {
                user_id: id,
                password_digest: digest,
            }))
        });

        let creds = LoginCredentials::try_from_parts("ada", password).expect("creds");
        let result = service(users).authenticate(&creds).await;
        match (ok, result) {
            (true, Ok(found)) => assert_eq!(found, id),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (_, other) => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn authenticate_unknown_user_is_unauthorized() {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(|_| Ok(None));
        let creds = LoginCredentials::try_from_parts("ghost", "whatever").expect("creds");
        let err = service(users)
            .authenticate(&creds)
            .await
            .expect_err("unknown user");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn unreadable_stored_digest_is_internal_error() {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(|_| {
            Ok(Some(StoredCredentials {
                user_id: UserId::random(),
                password_digest: "sha256$10000$00$00".to_owned(),
            }))
        });
        let creds = LoginCredentials::try_from_parts("ada", "whatever").expect("creds");
        let err = service(users)
            .authenticate(&creds)
            .await
            .expect_err("legacy digest");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn invalid_patch_never_reaches_repository() {
        let mut users = MockUserRepository::new();
        users.expect_find_account().never();
        users.expect_save_profile().never();

        let patch = ProfilePatch {
            term: Some("9Z".into()),
            ..ProfilePatch::default()
        };
        let err = service(users)
            .update_profile(&UserId::random(), patch)
            .await
            .expect_err("invalid term");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")),
            Some(&json!(ProfileField::Term.as_str()))
        );
    }

    #[tokio::test]
    async fn valid_patch_is_saved_and_returned() {
        let id = UserId::random();
        let mut users = MockUserRepository::new();
        users
            .expect_find_account()
            .return_once(move |_| Ok(Some(account(id))));
        users
            .expect_save_profile()
            .withf(|_, profile| profile.faculty == "Engineering")
            .times(1)
            .return_once(|_, _| Ok(true));

        let patch = ProfilePatch {
            faculty: Some("Engineering".into()),
            ..ProfilePatch::default()
        };
        let updated = service(users)
            .update_profile(&id, patch)
            .await
            .expect("updated");
        assert_eq!(updated.member.profile.faculty, "Engineering");
    }
}
