//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving
//! ports, so they can be exercised against mocks or in-memory adapters.

use std::sync::Arc;

use crate::domain::ports::{
    AccountService, MediaQuery, ObservationService, PlantService, TokenService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, profiles, and the staff listing.
    pub accounts: Arc<dyn AccountService>,
    /// Token issue, refresh, revocation, and bearer checks.
    pub tokens: Arc<dyn TokenService>,
    /// The caller's plants.
    pub plants: Arc<dyn PlantService>,
    /// The caller's observations.
    pub observations: Arc<dyn ObservationService>,
    /// Read access to stored images.
    pub media: Arc<dyn MediaQuery>,
}

impl HttpState {
    /// Bundle the ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use greenleaf::inbound::http::state::HttpState;
    /// # fn ports() -> (
    /// #     Arc<dyn greenleaf::domain::ports::AccountService>,
    /// #     Arc<dyn greenleaf::domain::ports::TokenService>,
    /// #     Arc<dyn greenleaf::domain::ports::PlantService>,
    /// #     Arc<dyn greenleaf::domain::ports::ObservationService>,
    /// #     Arc<dyn greenleaf::domain::ports::MediaQuery>,
    /// # ) { unimplemented!() }
    /// let (accounts, tokens, plants, observations, media) = ports();
    /// let state = HttpState::new(accounts, tokens, plants, observations, media);
    /// let _tokens = state.tokens.clone();
    /// ```
    pub fn new(
        accounts: Arc<dyn AccountService>,
        tokens: Arc<dyn TokenService>,
        plants: Arc<dyn PlantService>,
        observations: Arc<dyn ObservationService>,
        media: Arc<dyn MediaQuery>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            plants,
            observations,
            media,
        }
    }
}
