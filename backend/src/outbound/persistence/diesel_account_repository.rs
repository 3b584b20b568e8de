//! PostgreSQL-backed `AccountRepository` using Diesel.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{
    Account, AccountId, AccountSummary, Email, Gender, ImagePath, PasswordHash, Profile,
};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{AccountChangeset, AccountRow, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::{accounts, observations, plants};

/// Diesel implementation of [`AccountRepository`].
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> AccountRepositoryError {
    map_pool_error(error, AccountRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    map_diesel_error(
        error,
        AccountRepositoryError::query,
        AccountRepositoryError::connection,
    )
}

fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let email = Email::parse(&row.email).map_err(|err| {
        AccountRepositoryError::query(format!("stored email for {} is invalid: {err}", row.id))
    })?;
    let gender = row.gender.as_deref().and_then(|raw| {
        Gender::parse(raw)
            .inspect_err(|_| warn!(value = raw, account_id = %row.id, "ignoring unknown gender"))
            .ok()
    });
    Ok(Account {
        id: AccountId::from_uuid(row.id),
        email,
        password_hash: PasswordHash::from_phc(row.password_hash),
        profile: Profile {
            first_name: row.first_name,
            last_name: row.last_name,
            birthdate: row.birthdate,
            gender,
            phone_number: row.phone_number,
            profile_image: row.profile_image.map(ImagePath::new),
        },
        is_active: row.is_active,
        is_staff: row.is_staff,
        is_superuser: row.is_superuser,
    })
}

fn changeset(account: &Account) -> AccountChangeset<'_> {
    let profile = &account.profile;
    AccountChangeset {
        first_name: profile.first_name.as_deref(),
        last_name: profile.last_name.as_deref(),
        birthdate: profile.birthdate,
        gender: profile.gender.map(Gender::as_str),
        phone_number: profile.phone_number.as_deref(),
        profile_image: profile.profile_image.as_ref().map(AsRef::as_ref),
        is_active: account.is_active,
        is_staff: account.is_staff,
        is_superuser: account.is_superuser,
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let profile = &account.profile;
        let row = NewAccountRow {
            id: *account.id.as_uuid(),
            email: account.email.as_ref(),
            password_hash: account.password_hash.as_str(),
            first_name: profile.first_name.as_deref(),
            last_name: profile.last_name.as_deref(),
            birthdate: profile.birthdate,
            gender: profile.gender.map(Gender::as_str),
            phone_number: profile.phone_number.as_deref(),
            profile_image: profile.profile_image.as_ref().map(AsRef::as_ref),
            is_active: account.is_active,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
        };
        diesel::insert_into(accounts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AccountRepositoryError::duplicate_email(account.email.as_ref())
                } else {
                    diesel_error(err)
                }
            })
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = accounts::table
            .find(id.as_uuid())
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = accounts::table
            .filter(accounts::email.eq(email.as_ref()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn update(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(accounts::table.find(account.id.as_uuid()))
            .set(&changeset(account))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if updated == 0 {
            return Err(AccountRepositoryError::query("account vanished during update"));
        }
        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(accounts::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_summaries(&self) -> Result<Vec<AccountSummary>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<AccountRow> = accounts::table
            .order(accounts::email.asc())
            .select(AccountRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        let plant_counts: HashMap<Uuid, i64> = plants::table
            .group_by(plants::created_by)
            .select((plants::created_by, count_star()))
            .load::<(Uuid, i64)>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .collect();
        let observation_counts: HashMap<Uuid, i64> = observations::table
            .group_by(observations::created_by)
            .select((observations::created_by, count_star()))
            .load::<(Uuid, i64)>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .collect();

        rows.into_iter()
            .map(|row| {
                let plants = plant_counts.get(&row.id).copied().unwrap_or_default();
                let observations = observation_counts.get(&row.id).copied().unwrap_or_default();
                let account = row_to_account(row)?;
                Ok(AccountSummary {
                    id: account.id,
                    first_name: account.profile.first_name,
                    last_name: account.profile.last_name,
                    email: account.email,
                    total_plant_record: to_count(plants),
                    total_observation_records: to_count(observations),
                    is_staff: account.is_staff,
                    is_superuser: account.is_superuser,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> AccountRow {
        AccountRow {
            id: Uuid::new_v4(),
            email: "Ada@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            first_name: Some("Ada".to_owned()),
            last_name: None,
            birthdate: NaiveDate::from_ymd_opt(1815, 12, 10),
            gender: Some("Female".to_owned()),
            phone_number: None,
            profile_image: Some("users/x/a.png".to_owned()),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    #[rstest]
    fn rows_convert_to_accounts(row: AccountRow) {
        let id = row.id;
        let account = row_to_account(row).expect("valid row");
        assert_eq!(account.id, AccountId::from_uuid(id));
        assert_eq!(account.email.as_ref(), "Ada@example.com");
        assert_eq!(account.profile.gender, Some(Gender::Female));
        assert_eq!(
            account.profile.profile_image,
            Some(ImagePath::new("users/x/a.png"))
        );
    }

    #[rstest]
    fn unknown_gender_is_dropped(mut row: AccountRow) {
        row.gender = Some("Other".to_owned());
        let account = row_to_account(row).expect("valid row");
        assert_eq!(account.profile.gender, None);
    }

    #[rstest]
    fn corrupt_email_is_a_query_error(mut row: AccountRow) {
        row.email = "nonsense".to_owned();
        let err = row_to_account(row).expect_err("invalid email");
        assert!(matches!(err, AccountRepositoryError::Query { .. }));
    }

    #[rstest]
    fn changeset_writes_nulls_for_cleared_fields(row: AccountRow) {
        let mut account = row_to_account(row).expect("valid row");
        account.profile.first_name = None;
        account.profile.profile_image = None;
        let changes = changeset(&account);
        assert_eq!(changes.first_name, None);
        assert_eq!(changes.profile_image, None);
        assert_eq!(changes.gender, Some("Female"));
    }
}
