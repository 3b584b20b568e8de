//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed records the API and persistence layers
//! exchange, and the services that enforce ownership, validation, and token
//! rules on top of the driven ports.
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic failure payload.
//! - Account, Plant, Observation: stored records and their change sets.
//! - TokenClaims / TokenPair: session token data.
//! - AccountDirectory, TokenIssuer, PlantCatalogue, ObservationLog,
//!   MediaLibrary: services implementing the driving ports.

mod access;
mod account;
mod account_service;
mod auth;
mod error;
pub mod fields;
mod image;
mod media;
mod observation;
mod observation_service;
mod password;
mod plant;
mod plant_service;
pub mod ports;
mod token;
mod token_service;
mod trace_id;

pub use self::access::Caller;
pub use self::account::{
    Account, AccountId, AccountSummary, EMAIL_MAX, Email, Gender, NAME_MAX, PHONE_MAX, Profile,
    ProfileChanges,
};
pub use self::account_service::AccountDirectory;
pub use self::auth::{CredentialsValidationError, LoginCredentials, Registration};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::image::{ImageChange, ImageKind, ImagePath, ImageUpload, content_type_for};
pub use self::media::MediaLibrary;
pub use self::observation::{
    LOCATION_MAX, NOTE_MAX, Observation, ObservationChanges, ObservationFields, ObservationId,
};
pub use self::observation_service::ObservationLog;
pub use self::password::PasswordHash;
pub use self::plant::{
    DESCRIPTION_MAX, NewPlant, ORIGIN_MAX, PLANT_NAME_MAX, Plant, PlantChanges, PlantId,
};
pub use self::plant_service::PlantCatalogue;
pub use self::token::{
    RevokeOutcome, RevokedToken, TokenClaims, TokenLifetimes, TokenPair, TokenType,
};
pub use self::token_service::{INVALID_TOKEN_MESSAGE, TokenIssuer};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use greenleaf::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
