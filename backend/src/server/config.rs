//! HTTP server configuration object.

use std::net::SocketAddr;
use std::path::PathBuf;

use greenleaf::composition::TokenSettings;
use greenleaf::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) media_root: PathBuf,
    pub(crate) tokens: TokenSettings,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Configuration without a database; records stay in memory.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, media_root: PathBuf, tokens: TokenSettings) -> Self {
        Self {
            bind_addr,
            media_root,
            tokens,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
