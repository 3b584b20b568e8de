//! PostgreSQL-backed `TokenBlacklist` using Diesel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{TokenBlacklist, TokenBlacklistError};
use crate::domain::{RevokeOutcome, RevokedToken};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::BlacklistRow;
use super::pool::{DbPool, PoolError};
use super::schema::token_blacklist;

/// Diesel implementation of [`TokenBlacklist`].
///
/// `jti` is the primary key, so a second insert for the same token is a
/// no-op that reports [`RevokeOutcome::AlreadyRevoked`].
#[derive(Clone)]
pub struct DieselTokenBlacklist {
    pool: DbPool,
}

impl DieselTokenBlacklist {
    /// Create a blacklist over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> TokenBlacklistError {
    map_pool_error(error, TokenBlacklistError::connection)
}

fn diesel_error(error: diesel::result::Error) -> TokenBlacklistError {
    map_diesel_error(
        error,
        TokenBlacklistError::query,
        TokenBlacklistError::connection,
    )
}

fn to_row(token: &RevokedToken) -> BlacklistRow {
    BlacklistRow {
        jti: token.jti,
        account_id: *token.account_id.as_uuid(),
        expires_at: token.expires_at,
        revoked_at: token.revoked_at,
    }
}

#[async_trait]
impl TokenBlacklist for DieselTokenBlacklist {
    async fn revoke(&self, token: &RevokedToken) -> Result<RevokeOutcome, TokenBlacklistError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let inserted = diesel::insert_into(token_blacklist::table)
            .values(to_row(token))
            .on_conflict(token_blacklist::jti)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(if inserted == 0 {
            RevokeOutcome::AlreadyRevoked
        } else {
            RevokeOutcome::Revoked
        })
    }

    async fn is_revoked(&self, jti: &Uuid) -> Result<bool, TokenBlacklistError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::select(diesel::dsl::exists(
            token_blacklist::table.filter(token_blacklist::jti.eq(jti)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(diesel_error)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenBlacklistError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let purged = diesel::delete(token_blacklist::table.filter(token_blacklist::expires_at.lt(now)))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(purged as u64)
    }
}
