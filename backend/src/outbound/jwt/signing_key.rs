//! Environment-driven loading of the JWT signing secret.
//!
//! The secret is read from the file named by `GREENLEAF_JWT_SECRET_FILE`
//! (or a default secrets path). Debug builds fall back to an ephemeral key
//! when the file is unreadable; release builds only do so when
//! `GREENLEAF_JWT_ALLOW_EPHEMERAL` is set, which they reject outright.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use mockable::Env;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Environment variable naming the secret file.
pub const JWT_SECRET_FILE_ENV: &str = "GREENLEAF_JWT_SECRET_FILE";
/// Environment variable permitting an ephemeral secret.
pub const JWT_ALLOW_EPHEMERAL_ENV: &str = "GREENLEAF_JWT_ALLOW_EPHEMERAL";
/// Shortest secret accepted in release builds.
pub const JWT_KEY_MIN_LEN: usize = 32;

const JWT_SECRET_DEFAULT_PATH: &str = "/var/run/secrets/jwt_secret";
const EPHEMERAL_KEY_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing secret.
    Debug,
    /// Release builds require a real secret.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub const fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// HMAC secret, wiped from memory on drop.
#[derive(Clone)]
pub struct SigningKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl SigningKey {
    /// Wrap raw secret bytes.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Random secret for development runs.
    #[must_use]
    pub fn ephemeral() -> Self {
        let mut bytes = vec![0; EPHEMERAL_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    pub(super) fn expose(&self) -> &[u8] {
        &self.bytes
    }

    /// Truncated SHA-256 of the secret as 16 lowercase hex characters.
    ///
    /// Logged at startup so operators can tell which secret is live.
    ///
    /// # Examples
    /// ```
    /// use greenleaf::outbound::jwt::SigningKey;
    ///
    /// let fingerprint = SigningKey::from_bytes(vec![b'a'; 32]).fingerprint();
    /// assert_eq!(fingerprint.len(), 16);
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.expose());
        hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Errors raised while loading the signing secret.
#[derive(thiserror::Error, Debug)]
pub enum SigningKeyError {
    /// A variable is present but holds an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
    /// The secret file could not be read.
    #[error("failed to read JWT secret at {path}: {source}")]
    KeyRead {
        /// Secret path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The secret is too short for release builds.
    #[error("JWT secret at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Secret path.
        path: PathBuf,
        /// Bytes read.
        length: usize,
        /// Required minimum.
        min_len: usize,
    },
    /// Release builds must not use ephemeral secrets.
    #[error("GREENLEAF_JWT_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Load the signing secret according to the environment and build mode.
///
/// # Errors
/// Returns [`SigningKeyError`] when a release build has no usable secret or
/// a variable is malformed.
pub fn signing_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SigningKey, SigningKeyError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let path = PathBuf::from(
        env.string(JWT_SECRET_FILE_ENV)
            .unwrap_or_else(|| JWT_SECRET_DEFAULT_PATH.to_owned()),
    );

    match read_secret(&path) {
        Ok(bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < JWT_KEY_MIN_LEN {
                return Err(SigningKeyError::KeyTooShort {
                    path,
                    length,
                    min_len: JWT_KEY_MIN_LEN,
                });
            }
            let key = SigningKey::from_bytes(bytes.to_vec());
            info!(fingerprint = %key.fingerprint(), "loaded JWT signing key");
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using ephemeral JWT signing key (dev only)"
            );
            Ok(SigningKey::ephemeral())
        }
        Err(error) => Err(SigningKeyError::KeyRead {
            path,
            source: error,
        }),
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, SigningKeyError> {
    let Some(value) = env.string(JWT_ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(SigningKeyError::EphemeralNotAllowed),
        Some(false) => Ok(false),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid GREENLEAF_JWT_ALLOW_EPHEMERAL; treating as disabled");
            Ok(false)
        }
        None => Err(SigningKeyError::InvalidEnv {
            name: JWT_ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn read_secret(path: &Path) -> io::Result<Zeroizing<Vec<u8>>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "secret path has no file name")
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read(file_name).map(Zeroizing::new)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "signing_key_tests.rs"]
mod tests;
