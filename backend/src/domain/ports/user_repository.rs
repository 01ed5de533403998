//! Port abstraction for member persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Account, EmailAddress, Member, UserId, UserProfile, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another member already holds the username.
        DuplicateUsername { username: String } => "username already taken: {username}",
    }
}

/// Everything needed to create a member and its profile together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    /// Encoded password digest.
    pub password_digest: String,
    pub profile: UserProfile,
}

/// Stored login material for one username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user_id: UserId,
    pub password_digest: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the member and its profile atomically.
    async fn create_with_profile(&self, account: &NewAccount) -> Result<(), UserPersistenceError>;

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    async fn find_by_username(&self, username: &str)
    -> Result<Option<Member>, UserPersistenceError>;

    async fn find_account(&self, id: &UserId) -> Result<Option<Account>, UserPersistenceError>;

    /// Members for `ids`; unknown ids are skipped, order is not guaranteed.
    async fn members(&self, ids: &[UserId]) -> Result<Vec<Member>, UserPersistenceError>;

    /// Overwrite the stored profile. Returns `false` if the member is gone.
    async fn save_profile(
        &self,
        id: &UserId,
        profile: &UserProfile,
    ) -> Result<bool, UserPersistenceError>;
}
