//! Token domain service: issues, refreshes, verifies, and revokes session
//! tokens.
//!
//! Signature checks belong to the [`TokenCodec`]; this service owns the
//! rules layered on top. Expiry is measured against the injected clock, and
//! an access token dies with the refresh token that minted it.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ports::{
    LoginService, TokenBlacklist, TokenBlacklistError, TokenCodec, TokenCodecError, TokenService,
};
use crate::domain::{
    Account, Caller, Error, LoginCredentials, RevokeOutcome, RevokedToken, TokenClaims,
    TokenLifetimes, TokenPair, TokenType,
};

/// Message shared by every rejected token.
pub const INVALID_TOKEN_MESSAGE: &str = "Token is invalid or expired.";

/// Token service over a login port, blacklist, and codec.
#[derive(Clone)]
pub struct TokenIssuer<B> {
    login: Arc<dyn LoginService>,
    blacklist: Arc<B>,
    codec: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
    lifetimes: TokenLifetimes,
}

impl<B> TokenIssuer<B> {
    /// Create a service using the default lifetimes.
    pub fn new(
        login: Arc<dyn LoginService>,
        blacklist: Arc<B>,
        codec: Arc<dyn TokenCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            login,
            blacklist,
            codec,
            clock,
            lifetimes: TokenLifetimes::default(),
        }
    }

    /// Override the token lifetimes.
    #[must_use]
    pub fn with_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.lifetimes = lifetimes;
        self
    }
}

impl<B: TokenBlacklist> TokenIssuer<B> {
    fn invalid_token() -> Error {
        Error::token_invalid(INVALID_TOKEN_MESSAGE)
    }

    fn map_blacklist_error(error: TokenBlacklistError) -> Error {
        match error {
            TokenBlacklistError::Connection { message } => {
                Error::service_unavailable(format!("token blacklist unavailable: {message}"))
            }
            TokenBlacklistError::Query { message } => {
                Error::internal(format!("token blacklist error: {message}"))
            }
        }
    }

    fn encode(&self, claims: &TokenClaims) -> Result<String, Error> {
        self.codec.encode(claims).map_err(|error| match error {
            TokenCodecError::Signing { message } | TokenCodecError::Invalid { message } => {
                Error::internal(format!("token signing failed: {message}"))
            }
        })
    }

    /// Decode `token` and check its type and expiry.
    fn decode(&self, token: &str, expected: TokenType) -> Result<TokenClaims, Error> {
        let claims = self.codec.decode(token).map_err(|error| {
            debug!(%error, "token rejected by codec");
            Self::invalid_token()
        })?;
        if claims.token_type != expected {
            debug!(?expected, actual = ?claims.token_type, "token type mismatch");
            return Err(Self::invalid_token());
        }
        if claims.is_expired(self.clock.utc()) {
            debug!(jti = %claims.jti, "token expired");
            return Err(Self::invalid_token());
        }
        Ok(claims)
    }

    async fn ensure_live(&self, jti: &Uuid) -> Result<(), Error> {
        let revoked = self
            .blacklist
            .is_revoked(jti)
            .await
            .map_err(Self::map_blacklist_error)?;
        if revoked {
            debug!(%jti, "token revoked");
            return Err(Self::invalid_token());
        }
        Ok(())
    }

    fn mint(&self, account: &Account) -> Result<TokenPair, Error> {
        let now = self.clock.utc();
        let refresh = TokenClaims::refresh_for(account, now, self.lifetimes.refresh);
        let access = TokenClaims::access_from(&refresh, now, self.lifetimes.access);
        Ok(TokenPair {
            access: self.encode(&access)?,
            refresh: self.encode(&refresh)?,
        })
    }
}

#[async_trait]
impl<B: TokenBlacklist> TokenService for TokenIssuer<B> {
    async fn obtain_pair(&self, credentials: &LoginCredentials) -> Result<TokenPair, Error> {
        let account = self
            .login
            .authenticate(credentials)
            .await?
            .ok_or_else(|| Error::invalid_credentials("Invalid Credentials"))?;
        let pair = self.mint(&account)?;
        info!(account_id = %account.id, "token pair issued");
        Ok(pair)
    }

    async fn issue_for(&self, account: &Account) -> Result<TokenPair, Error> {
        self.mint(account)
    }

    async fn refresh(&self, refresh: &str) -> Result<String, Error> {
        let claims = self.decode(refresh, TokenType::Refresh)?;
        self.ensure_live(&claims.jti).await?;
        if self.login.find_active(&claims.user_id).await?.is_none() {
            debug!(account_id = %claims.user_id, "refresh for missing or inactive account");
            return Err(Self::invalid_token());
        }
        let access = TokenClaims::access_from(&claims, self.clock.utc(), self.lifetimes.access);
        self.encode(&access)
    }

    async fn revoke(&self, caller: &Caller, refresh: Option<String>) -> Result<(), Error> {
        let Some(token) = refresh.filter(|token| !token.trim().is_empty()) else {
            return Err(Error::invalid_field(
                "refresh",
                "required",
                "Refresh token is required.",
            ));
        };
        let claims = self.decode(token.trim(), TokenType::Refresh)?;
        if claims.user_id != *caller.account_id() {
            debug!(jti = %claims.jti, "refusing to revoke another account's token");
            return Err(Self::invalid_token());
        }

        let now = self.clock.utc();
        let entry = RevokedToken {
            jti: claims.jti,
            account_id: claims.user_id,
            expires_at: claims.expires_at(),
            revoked_at: now,
        };
        let outcome = self
            .blacklist
            .revoke(&entry)
            .await
            .map_err(Self::map_blacklist_error)?;
        if outcome == RevokeOutcome::AlreadyRevoked {
            return Err(Self::invalid_token());
        }
        let purged = self
            .blacklist
            .purge_expired(now)
            .await
            .map_err(Self::map_blacklist_error)?;
        info!(account_id = %claims.user_id, jti = %claims.jti, purged, "refresh token revoked");
        Ok(())
    }

    async fn authenticate_bearer(&self, access: &str) -> Result<Caller, Error> {
        let claims = self.decode(access, TokenType::Access)?;
        if let Some(parent) = claims.rjti {
            self.ensure_live(&parent).await?;
        }
        let account = self
            .login
            .find_active(&claims.user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("User not found"))?;
        Ok(Caller::from_account(&account))
    }
}

#[cfg(test)]
#[path = "token_service_tests.rs"]
mod tests;
