//! Test utilities for the greenleaf crate.
//!
//! [`TestBackend`] runs the full HTTP surface on the in-memory adapters with
//! a throwaway media directory, so integration tests in `tests/` exercise the
//! same wiring as the server without a database.

use std::io;
use std::path::Path;
use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use cap_std::{ambient_authority, fs::Dir};
use tempfile::TempDir;

use crate::Trace;
use crate::composition::{Adapters, TokenSettings};
use crate::domain::TokenLifetimes;
use crate::inbound::http::configure;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::outbound::jwt::{JwtCodec, SigningKey};
use crate::outbound::storage::FsImageStore;

const TEST_SIGNING_KEY: [u8; 32] = [0x5a; 32];

/// In-memory backend with its own media directory.
pub struct TestBackend {
    state: web::Data<HttpState>,
    health: web::Data<HealthState>,
    media: TempDir,
}

impl TestBackend {
    /// Fresh backend with no accounts and an empty media directory.
    ///
    /// # Errors
    /// Returns the I/O error when the temporary media directory cannot be
    /// created.
    pub fn new() -> io::Result<Self> {
        let media = tempfile::tempdir()?;
        let images = FsImageStore::open(media.path())?;
        let tokens = TokenSettings {
            codec: Arc::new(JwtCodec::new(&SigningKey::from_bytes(
                TEST_SIGNING_KEY.to_vec(),
            ))),
            clock: Arc::new(mockable::DefaultClock),
            lifetimes: TokenLifetimes::default(),
        };
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        Ok(Self {
            state: web::Data::new(Adapters::in_memory(images).into_http_state(tokens)),
            health,
            media,
        })
    }

    /// Shared handler state.
    #[must_use]
    pub fn state(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    /// Root of the media directory.
    #[must_use]
    pub fn media_root(&self) -> &Path {
        self.media.path()
    }

    /// Application with every route, the trace middleware, and the probes.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.health.clone())
            .app_data(self.state.clone())
            .wrap(Trace)
            .configure(configure)
            .service(ready)
            .service(live)
    }

    /// Number of regular files stored below the media root.
    ///
    /// # Errors
    /// Returns the I/O error raised while walking the directory.
    pub fn stored_file_count(&self) -> io::Result<usize> {
        let root = Dir::open_ambient_dir(self.media.path(), ambient_authority())?;
        count_files(&root)
    }
}

fn count_files(dir: &Dir) -> io::Result<usize> {
    let mut total = 0;
    for entry in dir.entries()? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            total += count_files(&entry.open_dir()?)?;
        } else {
            total += 1;
        }
    }
    Ok(total)
}
