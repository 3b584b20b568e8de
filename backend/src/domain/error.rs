//! Error envelope returned by every service.
//!
//! [`Error`] carries no transport detail; the HTTP adapter chooses a status
//! from the [`ErrorCode`] and serialises the rest as the JSON body.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::TraceId;

/// Response header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Payload failed validation.
    InvalidRequest,
    /// Email and password matched no active account.
    InvalidCredentials,
    /// Missing bearer token, or one that resolves to no active account.
    Unauthorized,
    /// Malformed, expired, revoked or mistyped token.
    TokenInvalid,
    /// Staff-only operation.
    Forbidden,
    /// Unknown record, or one owned by another account.
    NotFound,
    /// The record store or media store cannot be reached.
    ServiceUnavailable,
    /// Anything else.
    InternalError,
}

/// Error payload: `{code, message, traceId?, details?}`.
///
/// The trace identifier in scope when the error is built is captured, so a
/// client can quote it when reporting a problem.
///
/// ```
/// use greenleaf::domain::{Error, ErrorCode};
///
/// let err = Error::invalid_field("location", "required", "This field is required.");
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// assert_eq!(err.details().map(|d| d["field"].clone()), Some("location".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Error {
    #[schema(example = "not_found")]
    code: ErrorCode,
    #[schema(example = "No Plant matches the given query.")]
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

macro_rules! error_constructors {
    ($($name:ident => $code:ident),* $(,)?) => {
        $(
            #[doc = concat!("An [`ErrorCode::", stringify!($code), "`] error.")]
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorCode::$code, message)
            }
        )*
    };
}

impl Error {
    /// Build an error with the trace identifier currently in scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    error_constructors! {
        invalid_request => InvalidRequest,
        invalid_credentials => InvalidCredentials,
        unauthorized => Unauthorized,
        token_invalid => TokenInvalid,
        forbidden => Forbidden,
        not_found => NotFound,
        service_unavailable => ServiceUnavailable,
        internal => InternalError,
    }

    /// Validation failure pinned to one payload field.
    ///
    /// `code` is a short machine tag such as `required`, `unique` or
    /// `does_not_exist`.
    pub fn invalid_field(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self::invalid_request(message).with_details(json!({ "field": field, "code": code }))
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Replace the captured trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case(Error::invalid_request("x"), "invalid_request")]
    #[case(Error::invalid_credentials("x"), "invalid_credentials")]
    #[case(Error::unauthorized("x"), "unauthorized")]
    #[case(Error::token_invalid("x"), "token_invalid")]
    #[case(Error::forbidden("x"), "forbidden")]
    #[case(Error::not_found("x"), "not_found")]
    #[case(Error::service_unavailable("x"), "service_unavailable")]
    #[case(Error::internal("x"), "internal_error")]
    fn wire_codes_are_snake_case(#[case] error: Error, #[case] wire: &str) {
        let value = serde_json::to_value(&error).expect("serialise error");
        assert_eq!(value["code"], json!(wire));
    }

    #[rstest]
    fn bare_errors_omit_optional_fields() {
        let value = serde_json::to_value(Error::not_found("missing")).expect("serialise");
        assert_eq!(value, json!({ "code": "not_found", "message": "missing" }));
    }

    #[rstest]
    fn field_errors_carry_camel_case_envelope() {
        let value = serde_json::to_value(
            Error::invalid_field("email", "unique", "taken").with_trace_id("abc"),
        )
        .expect("serialise");
        assert_eq!(
            value,
            json!({
                "code": "invalid_request",
                "message": "taken",
                "traceId": "abc",
                "details": { "field": "email", "code": "unique" }
            })
        );
    }

    #[tokio::test]
    async fn captures_scoped_trace_id() {
        let trace_id = TraceId::from_uuid(Uuid::nil());
        let error = TraceId::scope(trace_id, async { Error::forbidden("nope") }).await;
        assert_eq!(error.trace_id(), Some(Uuid::nil().to_string().as_str()));
        assert_eq!(error.to_string(), "nope");
    }
}
