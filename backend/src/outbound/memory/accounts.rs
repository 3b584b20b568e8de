//! `AccountRepository` over the in-memory tables.

use async_trait::async_trait;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, AccountSummary, Email};

use super::MemoryStore;

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut tables = self.tables(AccountRepositoryError::query)?;
        if tables
            .accounts
            .values()
            .any(|existing| existing.email == account.email)
        {
            return Err(AccountRepositoryError::duplicate_email(
                account.email.to_string(),
            ));
        }
        tables.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let tables = self.tables(AccountRepositoryError::query)?;
        Ok(tables.accounts.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let tables = self.tables(AccountRepositoryError::query)?;
        Ok(tables
            .accounts
            .values()
            .find(|account| account.email == *email)
            .cloned())
    }

    async fn update(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut tables = self.tables(AccountRepositoryError::query)?;
        let stored = tables.accounts.get_mut(&account.id).ok_or_else(|| {
            AccountRepositoryError::query(format!("account {} does not exist", account.id))
        })?;
        stored.profile = account.profile.clone();
        stored.is_active = account.is_active;
        stored.is_staff = account.is_staff;
        stored.is_superuser = account.is_superuser;
        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, AccountRepositoryError> {
        let mut tables = self.tables(AccountRepositoryError::query)?;
        Ok(tables.remove_account(id))
    }

    async fn list_summaries(&self) -> Result<Vec<AccountSummary>, AccountRepositoryError> {
        let tables = self.tables(AccountRepositoryError::query)?;
        let count_plants = |owner: &AccountId| {
            tables
                .plants
                .values()
                .filter(|plant| plant.created_by == *owner)
                .count() as u64
        };
        let count_observations = |owner: &AccountId| {
            tables
                .observations
                .values()
                .filter(|fields| fields.created_by == *owner)
                .count() as u64
        };
        let mut summaries: Vec<AccountSummary> = tables
            .accounts
            .values()
            .map(|account| AccountSummary {
                id: account.id,
                first_name: account.profile.first_name.clone(),
                last_name: account.profile.last_name.clone(),
                email: account.email.clone(),
                total_plant_record: count_plants(&account.id),
                total_observation_records: count_observations(&account.id),
                is_staff: account.is_staff,
                is_superuser: account.is_superuser,
            })
            .collect();
        summaries.sort_by(|left, right| left.email.as_ref().cmp(right.email.as_ref()));
        Ok(summaries)
    }
}
