//! Session token claims, lifetimes, and blacklist entries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Account, AccountId};

/// Which half of a token pair a credential is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived bearer credential.
    Access,
    /// Long-lived credential that mints access tokens.
    Refresh,
}

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Access or refresh.
    pub token_type: TokenType,
    /// Unique token identifier.
    pub jti: Uuid,
    /// Account the token was issued to.
    pub user_id: AccountId,
    /// Account email at issue time.
    pub email: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// For access tokens: `jti` of the refresh token that minted them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rjti: Option<Uuid>,
}

impl TokenClaims {
    /// Refresh claims for `account`, valid from `now` for `lifetime`.
    #[must_use]
    pub fn refresh_for(account: &Account, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            token_type: TokenType::Refresh,
            jti: Uuid::new_v4(),
            user_id: account.id,
            email: account.email.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            rjti: None,
        }
    }

    /// Access claims minted from these refresh claims.
    #[must_use]
    pub fn access_from(refresh: &Self, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            token_type: TokenType::Access,
            jti: Uuid::new_v4(),
            user_id: refresh.user_id,
            email: refresh.email.clone(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            rjti: Some(refresh.jti),
        }
    }

    /// Whether the token has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Expiry as a timestamp; saturates to `now`-independent epoch on overflow.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Encoded access and refresh credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Bearer credential.
    pub access: String,
    /// Refresh credential.
    pub refresh: String,
}

/// Lifetimes applied when minting tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    /// Access token lifetime.
    pub access: Duration,
    /// Refresh token lifetime.
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(5),
            refresh: Duration::days(1),
        }
    }
}

/// Blacklist entry for a revoked refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedToken {
    /// Revoked refresh token identifier.
    pub jti: Uuid,
    /// Account the token was issued to.
    pub account_id: AccountId,
    /// When the token would have expired; the entry may be purged afterwards.
    pub expires_at: DateTime<Utc>,
    /// When it was revoked.
    pub revoked_at: DateTime<Utc>,
}

/// Result of adding a token to the blacklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// The token was newly blacklisted.
    Revoked,
    /// The token was already on the blacklist.
    AlreadyRevoked,
}
