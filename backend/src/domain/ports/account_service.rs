//! Driving port for registration, profiles, and the account listing.

use async_trait::async_trait;

use crate::domain::{Account, AccountSummary, Caller, Error, ProfileChanges, Registration};

/// Domain use-case port for account management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an ordinary active account.
    async fn register(&self, registration: &Registration) -> Result<Account, Error>;

    /// Create an active staff superuser.
    async fn create_superuser(&self, registration: &Registration) -> Result<Account, Error>;

    /// The caller's own account.
    async fn profile(&self, caller: &Caller) -> Result<Account, Error>;

    /// Apply profile changes to the caller's account.
    async fn update_profile(&self, caller: &Caller, changes: ProfileChanges)
    -> Result<Account, Error>;

    /// Delete the caller's account along with its records.
    async fn delete_account(&self, caller: &Caller) -> Result<(), Error>;

    /// Every account with record counts. Staff only.
    async fn list_accounts(&self, caller: &Caller) -> Result<Vec<AccountSummary>, Error>;
}
