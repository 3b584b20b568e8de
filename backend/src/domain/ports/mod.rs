//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`TokenBlacklist`], [`TokenCodec`],
//! [`ImageStore`]) are implemented by outbound adapters. Driving ports
//! (`*Service`, [`MediaQuery`]) are implemented by domain services and
//! called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod account_service;
mod image_store;
mod login_service;
mod media_query;
mod observation_repository;
mod observation_service;
mod plant_repository;
mod plant_service;
mod token_blacklist;
mod token_codec;
mod token_service;

pub use account_repository::{AccountRepository, AccountRepositoryError};
pub use account_service::AccountService;
pub use image_store::{ImageStore, ImageStoreError};
pub use login_service::LoginService;
pub use media_query::MediaQuery;
pub use observation_repository::{ObservationRepository, ObservationRepositoryError};
pub use observation_service::ObservationService;
pub use plant_repository::{PlantRepository, PlantRepositoryError};
pub use plant_service::PlantService;
pub use token_blacklist::{TokenBlacklist, TokenBlacklistError};
pub use token_codec::{TokenCodec, TokenCodecError};
pub use token_service::TokenService;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use account_service::MockAccountService;
#[cfg(test)]
pub use image_store::MockImageStore;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use media_query::MockMediaQuery;
#[cfg(test)]
pub use observation_repository::MockObservationRepository;
#[cfg(test)]
pub use observation_service::MockObservationService;
#[cfg(test)]
pub use plant_repository::MockPlantRepository;
#[cfg(test)]
pub use plant_service::MockPlantService;
#[cfg(test)]
pub use token_blacklist::MockTokenBlacklist;
#[cfg(test)]
pub use token_codec::MockTokenCodec;
#[cfg(test)]
pub use token_service::MockTokenService;
