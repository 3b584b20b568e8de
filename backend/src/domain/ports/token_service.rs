//! Driving port for session tokens.

use async_trait::async_trait;

use crate::domain::{Account, Caller, Error, LoginCredentials, TokenPair};

/// Domain use-case port for issuing, refreshing, and revoking tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Authenticate and mint a fresh pair.
    async fn obtain_pair(&self, credentials: &LoginCredentials) -> Result<TokenPair, Error>;

    /// Mint a pair for an account that has just been created.
    async fn issue_for(&self, account: &Account) -> Result<TokenPair, Error>;

    /// Mint a new access token from a refresh token.
    async fn refresh(&self, refresh: &str) -> Result<String, Error>;

    /// Blacklist the caller's refresh token.
    async fn revoke(&self, caller: &Caller, refresh: Option<String>) -> Result<(), Error>;

    /// Resolve a bearer access token to the calling account.
    async fn authenticate_bearer(&self, access: &str) -> Result<Caller, Error>;
}
