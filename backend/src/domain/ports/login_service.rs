//! Driving port for login use-cases.
//!
//! Inbound adapters authenticate credentials through this port without
//! knowing where accounts are stored.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated member id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
