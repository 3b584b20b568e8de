//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from the command line, `GREENLEAF_*` environment variables,
//! and configuration files, in that order of precedence.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::TokenLifetimes;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MEDIA_ROOT: &str = "media";

/// Settings rejected after loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A token lifetime was zero or negative.
    #[error("{name} must be positive, got {value}")]
    NonPositiveLifetime {
        /// Setting name.
        name: &'static str,
        /// Rejected value.
        value: i64,
    },
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GREENLEAF")]
pub struct GreenleafSettings {
    /// Listener address.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL; without one the server keeps everything in memory.
    pub database_url: Option<String>,
    /// Upper bound on open database connections.
    #[ortho_config(default = 10)]
    pub database_max_connections: u32,
    /// Directory holding uploaded images.
    pub media_root: Option<PathBuf>,
    /// Access token lifetime in minutes.
    #[ortho_config(default = 5)]
    pub access_token_minutes: i64,
    /// Refresh token lifetime in hours.
    #[ortho_config(default = 24)]
    pub refresh_token_hours: i64,
}

impl GreenleafSettings {
    /// Listener address, defaulting to all interfaces on port 8080.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Configured database URL, if any.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Connection cap for the database pool.
    #[must_use]
    pub const fn database_max_connections(&self) -> u32 {
        self.database_max_connections
    }

    /// Media directory, defaulting to `media` under the working directory.
    #[must_use]
    pub fn media_root(&self) -> &Path {
        self.media_root
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MEDIA_ROOT))
    }

    /// Validated token lifetimes.
    ///
    /// # Errors
    /// Returns [`SettingsError::NonPositiveLifetime`] for a zero or negative
    /// lifetime.
    pub fn token_lifetimes(&self) -> Result<TokenLifetimes, SettingsError> {
        let access = positive("access_token_minutes", self.access_token_minutes)?;
        let refresh = positive("refresh_token_hours", self.refresh_token_hours)?;
        Ok(TokenLifetimes {
            access: Duration::minutes(access),
            refresh: Duration::hours(refresh),
        })
    }
}

const fn positive(name: &'static str, value: i64) -> Result<i64, SettingsError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(SettingsError::NonPositiveLifetime { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "GREENLEAF_BIND_ADDR",
        "GREENLEAF_DATABASE_URL",
        "GREENLEAF_DATABASE_MAX_CONNECTIONS",
        "GREENLEAF_MEDIA_ROOT",
        "GREENLEAF_ACCESS_TOKEN_MINUTES",
        "GREENLEAF_REFRESH_TOKEN_HOURS",
    ];

    fn load_from_empty_args() -> GreenleafSettings {
        GreenleafSettings::load_from_iter([OsString::from("greenleaf")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert!(settings.database_url().is_none());
        assert_eq!(settings.database_max_connections(), 10);
        assert_eq!(settings.media_root(), Path::new("media"));
        assert_eq!(
            settings.token_lifetimes().expect("lifetimes"),
            TokenLifetimes::default()
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("GREENLEAF_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "GREENLEAF_DATABASE_URL",
                Some("postgres://localhost/greenleaf".to_owned()),
            ),
            ("GREENLEAF_DATABASE_MAX_CONNECTIONS", Some("4".to_owned())),
            ("GREENLEAF_MEDIA_ROOT", Some("/srv/media".to_owned())),
            ("GREENLEAF_ACCESS_TOKEN_MINUTES", Some("15".to_owned())),
            ("GREENLEAF_REFRESH_TOKEN_HOURS", Some("48".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse().expect("addr"));
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/greenleaf")
        );
        assert_eq!(settings.database_max_connections(), 4);
        assert_eq!(settings.media_root(), Path::new("/srv/media"));
        let lifetimes = settings.token_lifetimes().expect("lifetimes");
        assert_eq!(lifetimes.access, Duration::minutes(15));
        assert_eq!(lifetimes.refresh, Duration::hours(48));
    }

    #[rstest]
    #[case(0, 24, "access_token_minutes")]
    #[case(5, -1, "refresh_token_hours")]
    fn rejects_non_positive_lifetimes(
        #[case] access: i64,
        #[case] refresh: i64,
        #[case] expected: &str,
    ) {
        let settings = GreenleafSettings {
            bind_addr: None,
            database_url: None,
            database_max_connections: 10,
            media_root: None,
            access_token_minutes: access,
            refresh_token_hours: refresh,
        };
        let err = settings.token_lifetimes().expect_err("rejected");
        assert!(matches!(
            err,
            SettingsError::NonPositiveLifetime { name, .. } if name == expected
        ));
    }
}
