//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories translate between the internal row structs in `models` and
//! domain records; they hold no business rules. Connections come from a
//! `bb8` pool driven by `diesel-async`, and every database failure is
//! mapped onto the owning port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use greenleaf::outbound::persistence::{DbPool, DieselPlantRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/greenleaf")).await?;
//! let plants = DieselPlantRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_error_mapping;
mod diesel_observation_repository;
mod diesel_plant_repository;
mod diesel_token_blacklist;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_observation_repository::DieselObservationRepository;
pub use diesel_plant_repository::DieselPlantRepository;
pub use diesel_token_blacklist::DieselTokenBlacklist;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
