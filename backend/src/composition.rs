//! Wiring of domain services over concrete driven adapters.
//!
//! The server, the `create-superuser` tool, and the integration tests all
//! assemble the same services; only the adapters behind them differ.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountRepository, ImageStore, ObservationRepository, PlantRepository, TokenBlacklist,
    TokenCodec,
};
use crate::domain::{
    AccountDirectory, MediaLibrary, ObservationLog, PlantCatalogue, TokenIssuer, TokenLifetimes,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselObservationRepository, DieselPlantRepository,
    DieselTokenBlacklist,
};

/// Driven adapters backing one running instance.
pub struct Adapters<A, P, O, B, S> {
    accounts: Arc<A>,
    plants: Arc<P>,
    observations: Arc<O>,
    blacklist: Arc<B>,
    images: Arc<S>,
}

/// Adapters held entirely in process memory.
pub type MemoryAdapters<S> = Adapters<MemoryStore, MemoryStore, MemoryStore, MemoryStore, S>;

/// Adapters backed by PostgreSQL.
pub type PostgresAdapters<S> = Adapters<
    DieselAccountRepository,
    DieselPlantRepository,
    DieselObservationRepository,
    DieselTokenBlacklist,
    S,
>;

/// Signing and timing inputs for the token service.
#[derive(Clone)]
pub struct TokenSettings {
    /// Encodes and verifies session tokens.
    pub codec: Arc<dyn TokenCodec>,
    /// Source of "now" for token and observation timestamps.
    pub clock: Arc<dyn Clock>,
    /// Access and refresh lifetimes.
    pub lifetimes: TokenLifetimes,
}

impl<S> MemoryAdapters<S> {
    /// Every table in one fresh [`MemoryStore`].
    pub fn in_memory(images: S) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            accounts: Arc::clone(&store),
            plants: Arc::clone(&store),
            observations: Arc::clone(&store),
            blacklist: store,
            images: Arc::new(images),
        }
    }
}

impl<S> PostgresAdapters<S> {
    /// Diesel repositories sharing `pool`.
    pub fn postgres(pool: &DbPool, images: S) -> Self {
        Self {
            accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
            plants: Arc::new(DieselPlantRepository::new(pool.clone())),
            observations: Arc::new(DieselObservationRepository::new(pool.clone())),
            blacklist: Arc::new(DieselTokenBlacklist::new(pool.clone())),
            images: Arc::new(images),
        }
    }
}

impl<A, P, O, B, S> Adapters<A, P, O, B, S>
where
    A: AccountRepository + 'static,
    P: PlantRepository + 'static,
    O: ObservationRepository + 'static,
    B: TokenBlacklist + 'static,
    S: ImageStore + 'static,
{
    /// Account service over these adapters.
    pub fn account_directory(&self) -> AccountDirectory<A, S> {
        AccountDirectory::new(Arc::clone(&self.accounts), Arc::clone(&self.images))
    }

    /// Build every driving port for the HTTP adapter.
    pub fn into_http_state(self, tokens: TokenSettings) -> HttpState {
        let directory = Arc::new(self.account_directory());
        let issuer = TokenIssuer::new(
            directory.clone(),
            self.blacklist,
            tokens.codec,
            Arc::clone(&tokens.clock),
        )
        .with_lifetimes(tokens.lifetimes);
        let plants = PlantCatalogue::new(Arc::clone(&self.plants), Arc::clone(&self.images));
        let observations = ObservationLog::new(
            self.observations,
            self.plants,
            Arc::clone(&self.images),
            tokens.clock,
        );
        HttpState::new(
            directory,
            Arc::new(issuer),
            Arc::new(plants),
            Arc::new(observations),
            Arc::new(MediaLibrary::new(self.images)),
        )
    }
}
