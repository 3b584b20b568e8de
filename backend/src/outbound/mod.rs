//! Outbound adapters implementing the driven domain ports.
//!
//! - **persistence**: PostgreSQL repositories and blacklist using Diesel.
//! - **memory**: mutex-guarded stores for database-less runs and tests.
//! - **jwt**: HS256 token codec and signing-key loading.
//! - **storage**: capability-scoped filesystem image store.
//!
//! Adapters only translate between domain types and their infrastructure;
//! they hold no business rules.

pub mod jwt;
pub mod memory;
pub mod persistence;
pub mod storage;
