//! Observation domain service.
//!
//! A `related_plant_id` is accepted only when it names one of the caller's
//! own plants; anything else is a validation error, the same as an unknown
//! id.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::fields::WriteMode;
use crate::domain::media::{discard, stage_image};
use crate::domain::plant_service::map_plant_repository_error;
use crate::domain::ports::{
    ImageStore, ObservationRepository, ObservationRepositoryError, ObservationService,
    PlantRepository,
};
use crate::domain::{
    Caller, Error, ImageKind, Observation, ObservationChanges, ObservationId, PlantId,
};

/// Owner-scoped observation service.
#[derive(Clone)]
pub struct ObservationLog<O, P, S> {
    observations: Arc<O>,
    plants: Arc<P>,
    images: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<O, P, S> ObservationLog<O, P, S> {
    /// Create a service over the given adapters.
    pub fn new(
        observations: Arc<O>,
        plants: Arc<P>,
        images: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            observations,
            plants,
            images,
            clock,
        }
    }
}

fn map_observation_repository_error(error: ObservationRepositoryError) -> Error {
    match error {
        ObservationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("observation repository unavailable: {message}"))
        }
        ObservationRepositoryError::Query { message } => {
            Error::internal(format!("observation repository error: {message}"))
        }
    }
}

fn observation_not_found() -> Error {
    Error::not_found("observation not found")
}

impl<O, P, S> ObservationLog<O, P, S>
where
    O: ObservationRepository,
    P: PlantRepository,
    S: ImageStore,
{
    async fn fetch(&self, caller: &Caller, id: ObservationId) -> Result<Observation, Error> {
        let observation = self
            .observations
            .find_for_owner(caller.account_id(), id)
            .await
            .map_err(map_observation_repository_error)?
            .ok_or_else(observation_not_found)?;
        caller.ensure_owns(&observation.created_by, "observation")?;
        Ok(observation)
    }

    /// Reject references to plants the caller does not own.
    async fn check_related_plant(
        &self,
        caller: &Caller,
        related: Option<Option<PlantId>>,
    ) -> Result<(), Error> {
        let Some(Some(plant_id)) = related else {
            return Ok(());
        };
        let plant = self
            .plants
            .find_for_owner(caller.account_id(), plant_id)
            .await
            .map_err(map_plant_repository_error)?;
        if plant.is_none() {
            return Err(Error::invalid_field(
                "related_plant_id",
                "does_not_exist",
                format!("Invalid pk \"{plant_id}\" - object does not exist."),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<O, P, S> ObservationService for ObservationLog<O, P, S>
where
    O: ObservationRepository,
    P: PlantRepository,
    S: ImageStore,
{
    async fn list(&self, caller: &Caller) -> Result<Vec<Observation>, Error> {
        self.observations
            .list_for_owner(caller.account_id())
            .await
            .map_err(map_observation_repository_error)
    }

    async fn create(
        &self,
        caller: &Caller,
        changes: ObservationChanges,
    ) -> Result<Observation, Error> {
        let mut changes = changes.validate(WriteMode::Create)?;
        self.check_related_plant(caller, changes.related_plant_id)
            .await?;
        let owner = *caller.account_id();
        let swap = stage_image(
            self.images.as_ref(),
            ImageKind::Observation,
            &owner,
            None,
            std::mem::take(&mut changes.observation_image),
        )
        .await?;
        let fields = changes.into_fields(owner, swap.next(), self.clock.utc())?;
        match self.observations.insert(&fields).await {
            Ok(observation) => {
                swap.commit(self.images.as_ref()).await;
                info!(observation_id = %observation.id, account_id = %owner, "observation created");
                Ok(observation)
            }
            Err(error) => {
                swap.rollback(self.images.as_ref()).await;
                Err(map_observation_repository_error(error))
            }
        }
    }

    async fn retrieve(&self, caller: &Caller, id: ObservationId) -> Result<Observation, Error> {
        self.fetch(caller, id).await
    }

    async fn update(
        &self,
        caller: &Caller,
        id: ObservationId,
        changes: ObservationChanges,
        mode: WriteMode,
    ) -> Result<Observation, Error> {
        let mut changes = changes.validate(mode)?;
        let existing = self.fetch(caller, id).await?;
        self.check_related_plant(caller, changes.related_plant_id)
            .await?;
        let swap = stage_image(
            self.images.as_ref(),
            ImageKind::Observation,
            &existing.created_by,
            existing.observation_image.as_ref(),
            std::mem::take(&mut changes.observation_image),
        )
        .await?;

        let mut fields = existing.fields();
        changes.apply_to(&mut fields);
        fields.observation_image = swap.next();
        match self.observations.update(id, &fields).await {
            Ok(Some(observation)) => {
                swap.commit(self.images.as_ref()).await;
                Ok(observation)
            }
            Ok(None) => {
                swap.rollback(self.images.as_ref()).await;
                Err(observation_not_found())
            }
            Err(error) => {
                swap.rollback(self.images.as_ref()).await;
                Err(map_observation_repository_error(error))
            }
        }
    }

    async fn delete(&self, caller: &Caller, id: ObservationId) -> Result<(), Error> {
        let observation = self.fetch(caller, id).await?;
        let removed = self
            .observations
            .delete(caller.account_id(), id)
            .await
            .map_err(map_observation_repository_error)?;
        if !removed {
            return Err(observation_not_found());
        }
        if let Some(path) = &observation.observation_image {
            discard(self.images.as_ref(), path).await;
        }
        info!(observation_id = %id, "observation deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "observation_service_tests.rs"]
mod tests;
