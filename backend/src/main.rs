//! GreenLeaf server entry point: loads settings, prepares storage, and
//! serves the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, eyre};
use mockable::{DefaultClock, DefaultEnv};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use greenleaf::composition::TokenSettings;
use greenleaf::inbound::http::health::HealthState;
use greenleaf::outbound::jwt::{BuildMode, JwtCodec, signing_key_from_env};
use greenleaf::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use greenleaf::settings::GreenleafSettings;
use ortho_config::OrthoConfig;
use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = GreenleafSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let key = signing_key_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())?;
    let tokens = TokenSettings {
        codec: Arc::new(JwtCodec::new(&key)),
        clock: Arc::new(DefaultClock),
        lifetimes: settings.token_lifetimes()?,
    };

    let mut config = ServerConfig::new(
        settings.bind_addr(),
        settings.media_root().to_path_buf(),
        tokens,
    );
    if let Some(url) = settings.database_url() {
        run_pending_migrations(url).await?;
        let pool_config =
            PoolConfig::new(url).max_connections(settings.database_max_connections());
        let pool = DbPool::new(pool_config).await?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %settings.bind_addr(), "starting server");
    create_server(health_state, config)?.await?;
    Ok(())
}
