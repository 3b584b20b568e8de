//! Port abstraction for account persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, AccountSummary, Email};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// Another account already uses this email.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Durable store of accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account. Fails with
    /// [`AccountRepositoryError::DuplicateEmail`] when the email is taken.
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch an account by normalised email.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<Account>, AccountRepositoryError>;

    /// Persist profile fields and flags of an existing account.
    async fn update(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Delete an account and everything it owns. Returns whether a row was
    /// removed.
    async fn delete(&self, id: &AccountId) -> Result<bool, AccountRepositoryError>;

    /// Every account with its record counts, ordered by email.
    async fn list_summaries(&self) -> Result<Vec<AccountSummary>, AccountRepositoryError>;
}
