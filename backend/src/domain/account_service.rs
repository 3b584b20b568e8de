//! Account domain service.
//!
//! Implements both [`LoginService`] and [`AccountService`] on top of an
//! [`AccountRepository`], keeping password hashes and repository errors
//! inside the domain.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::media::{discard, stage_image};
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AccountService, ImageStore, LoginService,
};
use crate::domain::{
    Account, AccountId, AccountSummary, Caller, Email, Error, ImageKind, LoginCredentials,
    PasswordHash, ProfileChanges, Registration,
};

/// Account service backed by a repository and an image store.
#[derive(Clone)]
pub struct AccountDirectory<R, S> {
    accounts: Arc<R>,
    images: Arc<S>,
}

impl<R, S> AccountDirectory<R, S> {
    /// Create a service over the given adapters.
    pub fn new(accounts: Arc<R>, images: Arc<S>) -> Self {
        Self { accounts, images }
    }
}

impl<R, S> AccountDirectory<R, S>
where
    R: AccountRepository,
    S: ImageStore,
{
    fn map_repository_error(error: AccountRepositoryError) -> Error {
        match error {
            AccountRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("account repository unavailable: {message}"))
            }
            AccountRepositoryError::Query { message } => {
                Error::internal(format!("account repository error: {message}"))
            }
            AccountRepositoryError::DuplicateEmail { .. } => {
                Error::invalid_field("email", "unique", "user with this email already exists.")
            }
        }
    }

    async fn create(&self, registration: &Registration, superuser: bool) -> Result<Account, Error> {
        let password_hash = PasswordHash::hash(registration.password())?;
        let mut account = Account::new(registration.email().clone(), password_hash);
        if superuser {
            account.is_staff = true;
            account.is_superuser = true;
        }
        self.accounts
            .insert(&account)
            .await
            .map_err(Self::map_repository_error)?;
        info!(account_id = %account.id, superuser, "account created");
        Ok(account)
    }

    async fn own_account(&self, caller: &Caller) -> Result<Account, Error> {
        self.accounts
            .find_by_id(caller.account_id())
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found("account not found"))
    }
}

#[async_trait]
impl<R, S> LoginService for AccountDirectory<R, S>
where
    R: AccountRepository,
    S: ImageStore,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Option<Account>, Error> {
        // A malformed address cannot match a stored, normalised one.
        let Ok(email) = Email::parse(credentials.email()) else {
            return Ok(None);
        };
        let account = self
            .accounts
            .find_by_email(&email)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(account.filter(|account| {
            account.is_active && account.password_hash.verify(credentials.password())
        }))
    }

    async fn find_active(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        let account = self
            .accounts
            .find_by_id(id)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(account.filter(|account| account.is_active))
    }
}

#[async_trait]
impl<R, S> AccountService for AccountDirectory<R, S>
where
    R: AccountRepository,
    S: ImageStore,
{
    async fn register(&self, registration: &Registration) -> Result<Account, Error> {
        self.create(registration, false).await
    }

    async fn create_superuser(&self, registration: &Registration) -> Result<Account, Error> {
        self.create(registration, true).await
    }

    async fn profile(&self, caller: &Caller) -> Result<Account, Error> {
        self.own_account(caller).await
    }

    async fn update_profile(
        &self,
        caller: &Caller,
        changes: ProfileChanges,
    ) -> Result<Account, Error> {
        let mut changes = changes.validate()?;
        let mut account = self.own_account(caller).await?;
        let swap = stage_image(
            self.images.as_ref(),
            ImageKind::Profile,
            &account.id,
            account.profile.profile_image.as_ref(),
            std::mem::take(&mut changes.profile_image),
        )
        .await?;

        changes.apply_to(&mut account.profile);
        account.profile.profile_image = swap.next();
        if let Err(error) = self.accounts.update(&account).await {
            swap.rollback(self.images.as_ref()).await;
            return Err(Self::map_repository_error(error));
        }
        swap.commit(self.images.as_ref()).await;
        Ok(account)
    }

    async fn delete_account(&self, caller: &Caller) -> Result<(), Error> {
        let account = self.own_account(caller).await?;
        let removed = self
            .accounts
            .delete(&account.id)
            .await
            .map_err(Self::map_repository_error)?;
        if !removed {
            return Err(Error::not_found("account not found"));
        }
        if let Some(path) = &account.profile.profile_image {
            discard(self.images.as_ref(), path).await;
        }
        info!(account_id = %account.id, "account deleted");
        Ok(())
    }

    async fn list_accounts(&self, caller: &Caller) -> Result<Vec<AccountSummary>, Error> {
        caller.require_staff()?;
        self.accounts
            .list_summaries()
            .await
            .map_err(Self::map_repository_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
