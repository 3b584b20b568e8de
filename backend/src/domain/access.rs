//! Access control predicates.
//!
//! Handlers resolve a [`Caller`] from the bearer token and pass it
//! explicitly into every service operation.

use super::{Account, AccountId, Email, Error};

/// Authenticated principal performing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    account_id: AccountId,
    email: Email,
    is_staff: bool,
    is_superuser: bool,
}

impl Caller {
    /// Caller acting as `account`.
    #[must_use]
    pub fn from_account(account: &Account) -> Self {
        Self {
            account_id: account.id,
            email: account.email.clone(),
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
        }
    }

    /// Identifier of the calling account.
    #[must_use]
    pub const fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Email of the calling account.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Staff or superuser.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }

    /// Whether the caller owns a record created by `owner`.
    #[must_use]
    pub fn owns(&self, owner: &AccountId) -> bool {
        self.account_id == *owner
    }

    /// Fail with `Forbidden` unless the caller is an administrator.
    pub fn require_staff(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden(
                "You do not have permission to perform this action.",
            ))
        }
    }

    /// Fail with `NotFound` unless the caller owns the record, so foreign
    /// records are indistinguishable from missing ones.
    pub fn ensure_owns(&self, owner: &AccountId, what: &str) -> Result<(), Error> {
        if self.owns(owner) {
            Ok(())
        } else {
            Err(Error::not_found(format!("{what} not found")))
        }
    }
}
