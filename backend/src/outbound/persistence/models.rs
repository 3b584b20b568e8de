//! Internal Diesel row structs.
//!
//! Rows never leave the persistence layer; repositories translate them to
//! and from domain records.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, observations, plants, token_blacklist};

/// Row read from `accounts`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Insertable account; `date_joined` takes its column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub profile_image: Option<&'a str>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Profile and flag columns written on update. `None` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = accounts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AccountChangeset<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub profile_image: Option<&'a str>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Row read from `plants`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = plants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlantRow {
    pub id: i64,
    pub common_name: String,
    pub scientific_name: String,
    pub habitat: String,
    pub origin: Option<String>,
    pub description: Option<String>,
    pub plant_image: Option<String>,
    pub created_by: Uuid,
}

/// Writable plant columns, shared by insert and update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = plants)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PlantValues<'a> {
    pub common_name: &'a str,
    pub scientific_name: &'a str,
    pub habitat: &'a str,
    pub origin: Option<&'a str>,
    pub description: Option<&'a str>,
    pub plant_image: Option<&'a str>,
    pub created_by: Uuid,
}

/// Row read from `observations`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = observations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ObservationRow {
    pub id: i64,
    pub observation_image: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub note: Option<String>,
    pub created_by: Uuid,
}

/// Writable observation columns, shared by insert and update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = observations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ObservationValues<'a> {
    pub observation_image: Option<&'a str>,
    pub related_plant_id: Option<i64>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: &'a str,
    pub note: Option<&'a str>,
    pub created_by: Uuid,
}

/// Row in `token_blacklist`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = token_blacklist)]
pub(crate) struct BlacklistRow {
    pub jti: Uuid,
    pub account_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: DateTime<Utc>,
}
