//! GreenLeaf backend: accounts, session tokens, plants, and observations
//! behind a REST API.
//!
//! The crate follows a hexagonal layout. [`domain`] holds the records,
//! services, and ports; [`outbound`] implements the driven ports over
//! PostgreSQL, process memory, JWT, and the filesystem; [`inbound`] exposes
//! the driving ports over HTTP. [`composition`] wires them together.

pub mod composition;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
