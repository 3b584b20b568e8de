//! Port for signing and verifying session tokens.

use crate::domain::TokenClaims;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token codecs.
    pub enum TokenCodecError {
        /// The token is malformed or its signature does not verify.
        Invalid { message: String } => "token rejected: {message}",
        /// The claims could not be signed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Encodes claims into signed compact tokens and back.
///
/// Codecs check structure and signature only. Expiry, token type, and
/// revocation are domain rules enforced by the token service.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign `claims`.
    fn encode(&self, claims: &TokenClaims) -> Result<String, TokenCodecError>;

    /// Verify `token` and return its claims.
    fn decode(&self, token: &str) -> Result<TokenClaims, TokenCodecError>;
}
