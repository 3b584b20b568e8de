//! PostgreSQL-backed `PlantRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PlantRepository, PlantRepositoryError};
use crate::domain::{AccountId, ImagePath, NewPlant, Plant, PlantId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{PlantRow, PlantValues};
use super::pool::{DbPool, PoolError};
use super::schema::plants;

/// Diesel implementation of [`PlantRepository`].
#[derive(Clone)]
pub struct DieselPlantRepository {
    pool: DbPool,
}

impl DieselPlantRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> PlantRepositoryError {
    map_pool_error(error, PlantRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> PlantRepositoryError {
    map_diesel_error(
        error,
        PlantRepositoryError::query,
        PlantRepositoryError::connection,
    )
}

pub(crate) fn row_to_plant(row: PlantRow) -> Plant {
    Plant {
        id: PlantId::new(row.id),
        common_name: row.common_name,
        scientific_name: row.scientific_name,
        habitat: row.habitat,
        origin: row.origin,
        description: row.description,
        plant_image: row.plant_image.map(ImagePath::new),
        created_by: AccountId::from_uuid(row.created_by),
    }
}

fn values<'a>(
    common_name: &'a str,
    scientific_name: &'a str,
    habitat: &'a str,
    origin: Option<&'a str>,
    description: Option<&'a str>,
    plant_image: Option<&'a ImagePath>,
    created_by: &AccountId,
) -> PlantValues<'a> {
    PlantValues {
        common_name,
        scientific_name,
        habitat,
        origin,
        description,
        plant_image: plant_image.map(AsRef::as_ref),
        created_by: *created_by.as_uuid(),
    }
}

#[async_trait]
impl PlantRepository for DieselPlantRepository {
    async fn list_for_owner(&self, owner: &AccountId) -> Result<Vec<Plant>, PlantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<PlantRow> = plants::table
            .filter(plants::created_by.eq(owner.as_uuid()))
            .order(plants::id.asc())
            .select(PlantRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(row_to_plant).collect())
    }

    async fn find_for_owner(
        &self,
        owner: &AccountId,
        id: PlantId,
    ) -> Result<Option<Plant>, PlantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = plants::table
            .filter(plants::id.eq(id.get()))
            .filter(plants::created_by.eq(owner.as_uuid()))
            .select(PlantRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(row_to_plant))
    }

    async fn insert(&self, plant: &NewPlant) -> Result<Plant, PlantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::insert_into(plants::table)
            .values(values(
                &plant.common_name,
                &plant.scientific_name,
                &plant.habitat,
                plant.origin.as_deref(),
                plant.description.as_deref(),
                plant.plant_image.as_ref(),
                &plant.created_by,
            ))
            .returning(PlantRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(row_to_plant(row))
    }

    async fn update(&self, plant: &Plant) -> Result<bool, PlantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let target = plants::table
            .filter(plants::id.eq(plant.id.get()))
            .filter(plants::created_by.eq(plant.created_by.as_uuid()));
        let updated = diesel::update(target)
            .set(values(
                &plant.common_name,
                &plant.scientific_name,
                &plant.habitat,
                plant.origin.as_deref(),
                plant.description.as_deref(),
                plant.plant_image.as_ref(),
                &plant.created_by,
            ))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, owner: &AccountId, id: PlantId) -> Result<bool, PlantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        // Observations drop the reference through ON DELETE SET NULL.
        let deleted = diesel::delete(
            plants::table
                .filter(plants::id.eq(id.get()))
                .filter(plants::created_by.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}
