//! Driving port for the caller's observations.

use async_trait::async_trait;

use crate::domain::fields::WriteMode;
use crate::domain::{Caller, Error, Observation, ObservationChanges, ObservationId};

/// Domain use-case port for observation records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObservationService: Send + Sync {
    /// The caller's observations, oldest first.
    async fn list(&self, caller: &Caller) -> Result<Vec<Observation>, Error>;

    /// Create an observation owned by the caller.
    async fn create(
        &self,
        caller: &Caller,
        changes: ObservationChanges,
    ) -> Result<Observation, Error>;

    /// One of the caller's observations.
    async fn retrieve(&self, caller: &Caller, id: ObservationId) -> Result<Observation, Error>;

    /// Replace or patch one of the caller's observations.
    async fn update(
        &self,
        caller: &Caller,
        id: ObservationId,
        changes: ObservationChanges,
        mode: WriteMode,
    ) -> Result<Observation, Error>;

    /// Delete one of the caller's observations.
    async fn delete(&self, caller: &Caller, id: ObservationId) -> Result<(), Error>;
}
