//! Driving port for credential checks and account resolution.
//!
//! The token service and the bearer extractor call this port instead of the
//! account repository so they never see password hashes or storage errors.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, Error, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Return the active account matching `credentials`, or `None`.
    ///
    /// Unknown emails, wrong passwords, and inactive accounts are
    /// indistinguishable to the caller.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Option<Account>, Error>;

    /// Return the account `id` if it exists and is active.
    async fn find_active(&self, id: &AccountId) -> Result<Option<Account>, Error>;
}
