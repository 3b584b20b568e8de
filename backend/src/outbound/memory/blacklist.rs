//! `TokenBlacklist` over the in-memory tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{TokenBlacklist, TokenBlacklistError};
use crate::domain::{RevokeOutcome, RevokedToken};

use super::MemoryStore;

#[async_trait]
impl TokenBlacklist for MemoryStore {
    async fn revoke(&self, token: &RevokedToken) -> Result<RevokeOutcome, TokenBlacklistError> {
        let mut tables = self.tables(TokenBlacklistError::query)?;
        if tables.blacklist.contains_key(&token.jti) {
            return Ok(RevokeOutcome::AlreadyRevoked);
        }
        tables.blacklist.insert(token.jti, token.clone());
        Ok(RevokeOutcome::Revoked)
    }

    async fn is_revoked(&self, jti: &Uuid) -> Result<bool, TokenBlacklistError> {
        let tables = self.tables(TokenBlacklistError::query)?;
        Ok(tables.blacklist.contains_key(jti))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenBlacklistError> {
        let mut tables = self.tables(TokenBlacklistError::query)?;
        let before = tables.blacklist.len();
        tables.blacklist.retain(|_, entry| entry.expires_at >= now);
        Ok((before - tables.blacklist.len()) as u64)
    }
}
