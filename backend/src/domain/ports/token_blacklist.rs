//! Port for the refresh-token blacklist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{RevokeOutcome, RevokedToken};

use super::define_port_error;

define_port_error! {
    /// Errors raised by blacklist adapters.
    pub enum TokenBlacklistError {
        /// Store connection could not be established.
        Connection { message: String } => "token blacklist connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token blacklist query failed: {message}",
    }
}

/// Monotonic set of revoked refresh-token identifiers.
///
/// Entries are only ever removed by [`TokenBlacklist::purge_expired`], and
/// only once the token they describe has expired on its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Record `token` as revoked.
    async fn revoke(&self, token: &RevokedToken) -> Result<RevokeOutcome, TokenBlacklistError>;

    /// Whether `jti` has been revoked.
    async fn is_revoked(&self, jti: &Uuid) -> Result<bool, TokenBlacklistError>;

    /// Drop entries that expired before `now`; returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenBlacklistError>;
}
