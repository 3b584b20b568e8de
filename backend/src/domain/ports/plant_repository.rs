//! Port for owner-scoped plant persistence.
//!
//! Every lookup and mutation takes the owning account, so a record owned by
//! someone else behaves exactly like a missing one.

use async_trait::async_trait;

use crate::domain::{AccountId, NewPlant, Plant, PlantId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by plant repository adapters.
    pub enum PlantRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "plant repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "plant repository query failed: {message}",
    }
}

/// Durable store of plants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlantRepository: Send + Sync {
    /// The owner's plants in ascending id order.
    async fn list_for_owner(&self, owner: &AccountId) -> Result<Vec<Plant>, PlantRepositoryError>;

    /// The plant `id` if `owner` owns it.
    async fn find_for_owner(
        &self,
        owner: &AccountId,
        id: PlantId,
    ) -> Result<Option<Plant>, PlantRepositoryError>;

    /// Insert a plant and return it with its assigned id.
    async fn insert(&self, plant: &NewPlant) -> Result<Plant, PlantRepositoryError>;

    /// Overwrite the mutable columns of `plant`, scoped to its owner.
    /// Returns `false` when no row matched.
    async fn update(&self, plant: &Plant) -> Result<bool, PlantRepositoryError>;

    /// Delete the plant `id` if `owner` owns it, clearing references from
    /// observations. Returns whether a row was removed.
    async fn delete(&self, owner: &AccountId, id: PlantId) -> Result<bool, PlantRepositoryError>;
}
