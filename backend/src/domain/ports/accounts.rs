//! Driving ports for registration, profile edits and the signed-in member's
//! own view.

use async_trait::async_trait;

use crate::domain::{Account, Error, ProfilePatch, Registration, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create the member and its default profile.
    async fn register(&self, registration: &Registration) -> Result<UserId, Error>;

    /// Validate and apply `patch`, returning the updated account.
    async fn update_profile(&self, user: &UserId, patch: ProfilePatch) -> Result<Account, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    async fn current_account(&self, user: &UserId) -> Result<Account, Error>;
}
