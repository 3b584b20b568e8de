//! Plant and observation ports over the in-memory tables.
//!
//! Every lookup filters on the owner, so a foreign id behaves exactly like a
//! missing one.

use async_trait::async_trait;

use crate::domain::ports::{
    ObservationRepository, ObservationRepositoryError, PlantRepository, PlantRepositoryError,
};
use crate::domain::{
    AccountId, NewPlant, Observation, ObservationFields, ObservationId, Plant, PlantId,
};

use super::MemoryStore;

#[async_trait]
impl PlantRepository for MemoryStore {
    async fn list_for_owner(&self, owner: &AccountId) -> Result<Vec<Plant>, PlantRepositoryError> {
        let tables = self.tables(PlantRepositoryError::query)?;
        Ok(tables
            .plants
            .values()
            .filter(|plant| plant.created_by == *owner)
            .cloned()
            .collect())
    }

    async fn find_for_owner(
        &self,
        owner: &AccountId,
        id: PlantId,
    ) -> Result<Option<Plant>, PlantRepositoryError> {
        let tables = self.tables(PlantRepositoryError::query)?;
        Ok(tables
            .plants
            .get(&id)
            .filter(|plant| plant.created_by == *owner)
            .cloned())
    }

    async fn insert(&self, plant: &NewPlant) -> Result<Plant, PlantRepositoryError> {
        let mut tables = self.tables(PlantRepositoryError::query)?;
        if !tables.accounts.contains_key(&plant.created_by) {
            return Err(PlantRepositoryError::query(format!(
                "owner {} does not exist",
                plant.created_by
            )));
        }
        let id = tables.next_plant_id();
        let stored = Plant {
            id,
            common_name: plant.common_name.clone(),
            scientific_name: plant.scientific_name.clone(),
            habitat: plant.habitat.clone(),
            origin: plant.origin.clone(),
            description: plant.description.clone(),
            plant_image: plant.plant_image.clone(),
            created_by: plant.created_by,
        };
        tables.plants.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, plant: &Plant) -> Result<bool, PlantRepositoryError> {
        let mut tables = self.tables(PlantRepositoryError::query)?;
        match tables.plants.get_mut(&plant.id) {
            Some(stored) if stored.created_by == plant.created_by => {
                *stored = plant.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, owner: &AccountId, id: PlantId) -> Result<bool, PlantRepositoryError> {
        let mut tables = self.tables(PlantRepositoryError::query)?;
        let owned = tables
            .plants
            .get(&id)
            .is_some_and(|plant| plant.created_by == *owner);
        Ok(owned && tables.remove_plant(id))
    }
}

#[async_trait]
impl ObservationRepository for MemoryStore {
    async fn list_for_owner(
        &self,
        owner: &AccountId,
    ) -> Result<Vec<Observation>, ObservationRepositoryError> {
        let tables = self.tables(ObservationRepositoryError::query)?;
        Ok(tables
            .observations
            .iter()
            .filter(|(_, fields)| fields.created_by == *owner)
            .map(|(id, fields)| tables.observation(*id, fields))
            .collect())
    }

    async fn find_for_owner(
        &self,
        owner: &AccountId,
        id: ObservationId,
    ) -> Result<Option<Observation>, ObservationRepositoryError> {
        let tables = self.tables(ObservationRepositoryError::query)?;
        Ok(tables
            .observations
            .get(&id)
            .filter(|fields| fields.created_by == *owner)
            .map(|fields| tables.observation(id, fields)))
    }

    async fn insert(
        &self,
        fields: &ObservationFields,
    ) -> Result<Observation, ObservationRepositoryError> {
        let mut tables = self.tables(ObservationRepositoryError::query)?;
        if !tables.accounts.contains_key(&fields.created_by) {
            return Err(ObservationRepositoryError::query(format!(
                "owner {} does not exist",
                fields.created_by
            )));
        }
        let id = tables.next_observation_id();
        tables.observations.insert(id, fields.clone());
        Ok(tables.observation(id, fields))
    }

    async fn update(
        &self,
        id: ObservationId,
        fields: &ObservationFields,
    ) -> Result<Option<Observation>, ObservationRepositoryError> {
        let mut tables = self.tables(ObservationRepositoryError::query)?;
        match tables.observations.get_mut(&id) {
            Some(stored) if stored.created_by == fields.created_by => {
                *stored = fields.clone();
            }
            _ => return Ok(None),
        }
        Ok(Some(tables.observation(id, fields)))
    }

    async fn delete(
        &self,
        owner: &AccountId,
        id: ObservationId,
    ) -> Result<bool, ObservationRepositoryError> {
        let mut tables = self.tables(ObservationRepositoryError::query)?;
        let owned = tables
            .observations
            .get(&id)
            .is_some_and(|fields| fields.created_by == *owner);
        if owned {
            tables.observations.remove(&id);
        }
        Ok(owned)
    }
}
