//! Selection of driven adapters for the HTTP state.

use greenleaf::composition::Adapters;
use greenleaf::inbound::http::state::HttpState;
use greenleaf::outbound::storage::FsImageStore;
use tracing::{info, warn};

use super::ServerConfig;

/// Compose the HTTP state over PostgreSQL when a pool is configured and
/// over the in-memory store otherwise.
///
/// # Errors
/// Returns the I/O error when the media root cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let images = FsImageStore::open(&config.media_root)?;
    info!(media_root = %config.media_root.display(), "image store ready");
    let tokens = config.tokens.clone();
    Ok(match &config.db_pool {
        Some(pool) => Adapters::postgres(pool, images).into_http_state(tokens),
        None => {
            warn!("no database configured; records are kept in memory and lost on exit");
            Adapters::in_memory(images).into_http_state(tokens)
        }
    })
}
