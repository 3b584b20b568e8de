//! Argon2id password hashing.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash as PhcHash, PasswordHasher, PasswordVerifier, SaltString, rand_core,
};

use super::Error;

/// Argon2 PHC string for a stored account password.
///
/// The plaintext never leaves [`PasswordHash::hash`]; only the salted hash is
/// persisted or compared.
///
/// # Examples
/// ```
/// use greenleaf::domain::PasswordHash;
///
/// let hash = PasswordHash::hash("pw123").unwrap();
/// assert_ne!(hash.as_str(), "pw123");
/// assert!(hash.verify("pw123"));
/// assert!(!hash.verify("pw124"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` with a fresh random salt.
    pub fn hash(password: &str) -> Result<Self, Error> {
        let salt = SaltString::generate(&mut rand_core::OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }

    /// Wrap a PHC string loaded from storage.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Stored PHC string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether `password` matches. Malformed stored hashes never match.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        PhcHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}
