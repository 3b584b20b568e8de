//! PostgreSQL-backed `ObservationRepository` using Diesel.
//!
//! Reads left-join `plants` so each observation carries its related plant.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{ObservationRepository, ObservationRepositoryError};
use crate::domain::{AccountId, ImagePath, Observation, ObservationFields, ObservationId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_plant_repository::row_to_plant;
use super::models::{ObservationRow, ObservationValues, PlantRow};
use super::pool::{DbPool, PoolError};
use super::schema::{observations, plants};

/// Diesel implementation of [`ObservationRepository`].
#[derive(Clone)]
pub struct DieselObservationRepository {
    pool: DbPool,
}

impl DieselObservationRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type JoinedRow = (ObservationRow, Option<PlantRow>);

fn pool_error(error: PoolError) -> ObservationRepositoryError {
    map_pool_error(error, ObservationRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ObservationRepositoryError {
    map_diesel_error(
        error,
        ObservationRepositoryError::query,
        ObservationRepositoryError::connection,
    )
}

fn row_to_observation((row, plant): JoinedRow) -> Observation {
    Observation {
        id: ObservationId::new(row.id),
        observation_image: row.observation_image.map(ImagePath::new),
        related_plant: plant.map(row_to_plant),
        date: row.date,
        time: row.time,
        location: row.location,
        note: row.note,
        created_by: AccountId::from_uuid(row.created_by),
    }
}

fn values(fields: &ObservationFields) -> ObservationValues<'_> {
    ObservationValues {
        observation_image: fields.observation_image.as_ref().map(AsRef::as_ref),
        related_plant_id: fields.related_plant_id.map(|id| id.get()),
        date: fields.date,
        time: fields.time,
        location: &fields.location,
        note: fields.note.as_deref(),
        created_by: *fields.created_by.as_uuid(),
    }
}

async fn load_one(
    conn: &mut AsyncPgConnection,
    owner: &AccountId,
    id: i64,
) -> Result<Option<Observation>, diesel::result::Error> {
    let row: Option<JoinedRow> = observations::table
        .left_join(plants::table)
        .filter(observations::id.eq(id))
        .filter(observations::created_by.eq(owner.as_uuid()))
        .select((ObservationRow::as_select(), Option::<PlantRow>::as_select()))
        .first(conn)
        .await
        .optional()?;
    Ok(row.map(row_to_observation))
}

async fn load_required(
    conn: &mut AsyncPgConnection,
    owner: &AccountId,
    id: i64,
) -> Result<Observation, ObservationRepositoryError> {
    load_one(conn, owner, id)
        .await
        .map_err(diesel_error)?
        .ok_or_else(|| ObservationRepositoryError::query("observation vanished after write"))
}

#[async_trait]
impl ObservationRepository for DieselObservationRepository {
    async fn list_for_owner(
        &self,
        owner: &AccountId,
    ) -> Result<Vec<Observation>, ObservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<JoinedRow> = observations::table
            .left_join(plants::table)
            .filter(observations::created_by.eq(owner.as_uuid()))
            .order(observations::id.asc())
            .select((ObservationRow::as_select(), Option::<PlantRow>::as_select()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(row_to_observation).collect())
    }

    async fn find_for_owner(
        &self,
        owner: &AccountId,
        id: ObservationId,
    ) -> Result<Option<Observation>, ObservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        load_one(&mut conn, owner, id.get())
            .await
            .map_err(diesel_error)
    }

    async fn insert(
        &self,
        fields: &ObservationFields,
    ) -> Result<Observation, ObservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let id: i64 = diesel::insert_into(observations::table)
            .values(values(fields))
            .returning(observations::id)
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        load_required(&mut conn, &fields.created_by, id).await
    }

    async fn update(
        &self,
        id: ObservationId,
        fields: &ObservationFields,
    ) -> Result<Option<Observation>, ObservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let target = observations::table
            .filter(observations::id.eq(id.get()))
            .filter(observations::created_by.eq(fields.created_by.as_uuid()));
        let updated = diesel::update(target)
            .set(values(fields))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if updated == 0 {
            return Ok(None);
        }
        load_required(&mut conn, &fields.created_by, id.get())
            .await
            .map(Some)
    }

    async fn delete(
        &self,
        owner: &AccountId,
        id: ObservationId,
    ) -> Result<bool, ObservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            observations::table
                .filter(observations::id.eq(id.get()))
                .filter(observations::created_by.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}
