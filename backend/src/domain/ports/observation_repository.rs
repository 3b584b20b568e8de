//! Port for owner-scoped observation persistence.

use async_trait::async_trait;

use crate::domain::{AccountId, Observation, ObservationFields, ObservationId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by observation repository adapters.
    pub enum ObservationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "observation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "observation repository query failed: {message}",
    }
}

/// Durable store of observations. Reads resolve `related_plant`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObservationRepository: Send + Sync {
    /// The owner's observations in ascending id order.
    async fn list_for_owner(
        &self,
        owner: &AccountId,
    ) -> Result<Vec<Observation>, ObservationRepositoryError>;

    /// The observation `id` if `owner` owns it.
    async fn find_for_owner(
        &self,
        owner: &AccountId,
        id: ObservationId,
    ) -> Result<Option<Observation>, ObservationRepositoryError>;

    /// Insert an observation and return it as stored.
    async fn insert(
        &self,
        fields: &ObservationFields,
    ) -> Result<Observation, ObservationRepositoryError>;

    /// Overwrite observation `id` owned by `fields.created_by`. Returns
    /// `None` when no row matched.
    async fn update(
        &self,
        id: ObservationId,
        fields: &ObservationFields,
    ) -> Result<Option<Observation>, ObservationRepositoryError>;

    /// Delete observation `id` if `owner` owns it.
    async fn delete(
        &self,
        owner: &AccountId,
        id: ObservationId,
    ) -> Result<bool, ObservationRepositoryError>;
}
