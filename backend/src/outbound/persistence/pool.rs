//! Shared PostgreSQL connections for the Diesel repositories.
//!
//! All four repositories hold clones of one [`DbPool`]. A checkout that
//! cannot be satisfied surfaces as [`PoolError`] and each repository reports
//! it as its own `Connection` variant, which the HTTP layer renders as 503.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_IDLE_CONNECTIONS: u32 = 2;
const DEFAULT_CHECKOUT_WAIT: Duration = Duration::from_secs(30);

/// Pooled connection borrowed for the span of one repository call.
pub type PgConnection<'a> = PooledConnection<'a, AsyncPgConnection>;

/// Failure to reach the database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Every connection stayed busy past the checkout wait.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },
    /// The initial connections could not be opened.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Where to connect and how many connections to hold.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_connections: u32,
    checkout_wait: Duration,
}

impl PoolConfig {
    /// Ten connections with a thirty second checkout wait.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            checkout_wait: DEFAULT_CHECKOUT_WAIT,
        }
    }

    /// Cap the number of open connections. Zero is raised to one.
    #[must_use]
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// How long a repository call waits for a free connection.
    #[must_use]
    pub fn checkout_wait(mut self, wait: Duration) -> Self {
        self.checkout_wait = wait;
        self
    }

    fn idle_connections(&self) -> u32 {
        DEFAULT_IDLE_CONNECTIONS.min(self.max_connections)
    }
}

/// Cloneable handle to the shared pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open the pool described by `config`.
    ///
    /// # Errors
    /// [`PoolError::Build`] when the initial connections cannot be opened.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.idle_connections()))
            .connection_timeout(config.checkout_wait)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Borrow a connection.
    ///
    /// # Errors
    /// [`PoolError::Checkout`] when none frees up within the checkout wait.
    pub async fn get(&self) -> Result<PgConnection<'_>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
