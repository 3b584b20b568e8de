//! HS256 session-token codec and signing-key loading.
//!
//! The codec verifies signatures and token shape only. Expiry is checked by
//! the token service against its injected clock, so `exp` validation is off
//! here.

mod signing_key;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::TokenClaims;
use crate::domain::ports::{TokenCodec, TokenCodecError};

pub use signing_key::{
    BuildMode, JWT_ALLOW_EPHEMERAL_ENV, JWT_KEY_MIN_LEN, JWT_SECRET_FILE_ENV, SigningKey,
    SigningKeyError, signing_key_from_env,
};

/// [`TokenCodec`] backed by `jsonwebtoken` with a shared HMAC secret.
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    /// Build a codec signing with `key`.
    ///
    /// # Examples
    /// ```
    /// use greenleaf::outbound::jwt::{JwtCodec, SigningKey};
    ///
    /// let codec = JwtCodec::new(&SigningKey::from_bytes(vec![7; 32]));
    /// # drop(codec);
    /// ```
    #[must_use]
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(key.expose()),
            decoding: DecodingKey::from_secret(key.expose()),
            validation,
        }
    }
}

impl TokenCodec for JwtCodec {
    fn encode(&self, claims: &TokenClaims) -> Result<String, TokenCodecError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|err| TokenCodecError::signing(err.to_string()))
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenCodecError> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| TokenCodecError::invalid(err.to_string()))
    }
}
