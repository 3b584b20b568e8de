//! Bearer authentication for HTTP handlers.
//!
//! Handlers take an [`Authenticated`] argument to require a valid access
//! token; the extractor resolves it to a [`Caller`] through the token port.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Caller, Error};
use crate::inbound::http::state::HttpState;

pub(crate) const CREDENTIALS_MISSING: &str = "Authentication credentials were not provided.";
const BEARER: &str = "Bearer";

/// The authenticated caller of the current request.
#[derive(Debug, Clone)]
pub struct Authenticated(Caller);

impl Authenticated {
    /// Borrow the caller.
    #[must_use]
    pub const fn caller(&self) -> &Caller {
        &self.0
    }
}

/// Extract the raw token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<String, Error> {
    let missing = || Error::unauthorized(CREDENTIALS_MISSING);
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(missing)?
        .to_str()
        .map_err(|_| Error::unauthorized("Authorization header must be ASCII"))?;
    let mut parts = value.split_whitespace();
    if parts.next() != Some(BEARER) {
        return Err(missing());
    }
    match (parts.next(), parts.next()) {
        (Some(token), None) => Ok(token.to_owned()),
        _ => Err(Error::unauthorized(
            "Authorization header must contain two space-delimited values",
        )),
    }
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req.headers());
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let caller = state.tokens.authenticate_bearer(&token?).await?;
            Ok(Self(caller))
        })
    }
}
