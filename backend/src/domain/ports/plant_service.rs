//! Driving port for the caller's plants.

use async_trait::async_trait;

use crate::domain::fields::WriteMode;
use crate::domain::{Caller, Error, Plant, PlantChanges, PlantId};

/// Domain use-case port for plant records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlantService: Send + Sync {
    /// The caller's plants, oldest first.
    async fn list(&self, caller: &Caller) -> Result<Vec<Plant>, Error>;

    /// Create a plant owned by the caller.
    async fn create(&self, caller: &Caller, changes: PlantChanges) -> Result<Plant, Error>;

    /// One of the caller's plants.
    async fn retrieve(&self, caller: &Caller, id: PlantId) -> Result<Plant, Error>;

    /// Replace or patch one of the caller's plants.
    async fn update(
        &self,
        caller: &Caller,
        id: PlantId,
        changes: PlantChanges,
        mode: WriteMode,
    ) -> Result<Plant, Error>;

    /// Delete one of the caller's plants.
    async fn delete(&self, caller: &Caller, id: PlantId) -> Result<(), Error>;
}
