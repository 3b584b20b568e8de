//! Create a staff superuser account against the configured database.
//!
//! ```text
//! GREENLEAF_DATABASE_URL=postgres://localhost/greenleaf \
//!     create-superuser --email admin@example.com --password s3cret
//! ```

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use greenleaf::composition::Adapters;
use greenleaf::domain::Registration;
use greenleaf::domain::ports::AccountService;
use greenleaf::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use greenleaf::outbound::storage::FsImageStore;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "create-superuser", about = "Create a GreenLeaf superuser")]
struct Args {
    /// Login email for the new account.
    #[arg(long)]
    email: String,
    /// Password; read from the environment when omitted.
    #[arg(long, env = "GREENLEAF_SUPERUSER_PASSWORD", hide_env_values = true)]
    password: String,
    /// PostgreSQL connection URL.
    #[arg(long, env = "GREENLEAF_DATABASE_URL", hide_env_values = true)]
    database_url: String,
    /// Media directory shared with the server.
    #[arg(long, env = "GREENLEAF_MEDIA_ROOT", default_value = "media")]
    media_root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        warn!(error = %e, "tracing init failed");
    }
    let args = Args::parse();

    let registration = Registration::try_from_parts(&args.email, &args.password, &args.password)
        .map_err(|err| eyre!("invalid superuser credentials: {err}"))?;

    run_pending_migrations(&args.database_url).await?;
    let pool = DbPool::new(PoolConfig::new(args.database_url.as_str())).await?;
    let images = FsImageStore::open(&args.media_root)?;
    let accounts = Adapters::postgres(&pool, images).account_directory();

    let account = accounts
        .create_superuser(&registration)
        .await
        .map_err(|err| eyre!("failed to create superuser: {err}"))?;
    info!(account_id = %account.id, email = %account.email, "superuser created");
    Ok(())
}
