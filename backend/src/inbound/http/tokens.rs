//! Token and registration handlers.
//!
//! ```text
//! POST /api/token/ {"email":"a@x.com","password":"pw123"}
//! POST /api/token/refresh/ {"refresh":"<jwt>"}
//! POST /api/register/ {"email":"a@x.com","password":"pw123","confirm_password":"pw123"}
//! POST /api/logout/ {"refresh":"<jwt>"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ApiResult, Error, ErrorCode, INVALID_TOKEN_MESSAGE, LoginCredentials, Registration, TokenPair,
};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/token/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct TokenObtainRequest {
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "pw123")]
    pub password: String,
}

/// Access and refresh credentials.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(value: TokenPair) -> Self {
        Self {
            access: value.access,
            refresh: value.refresh,
        }
    }
}

/// Body of `POST /api/token/refresh/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct TokenRefreshRequest {
    pub refresh: String,
}

/// Freshly minted access credential.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AccessResponse {
    pub access: String,
}

/// Body of `POST /api/register/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    #[schema(example = "a@x.com")]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Account echoed after registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisteredUser {
    pub email: String,
}

/// Registration result: the new account and its first token pair.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: RegisteredUser,
    pub refresh: String,
    pub access: String,
}

/// Body of `POST /api/logout/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct LogoutRequest {
    pub refresh: Option<String>,
}

/// Plain confirmation message.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DetailResponse {
    #[schema(example = "Logout successful.")]
    pub detail: String,
}

/// Exchange email and password for a token pair.
#[utoipa::path(
    post,
    path = "/api/token/",
    request_body = TokenObtainRequest,
    responses(
        (status = 200, description = "Token pair", body = TokenPairResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "obtainToken",
    security([])
)]
#[post("/token/")]
pub async fn obtain_token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenObtainRequest>,
) -> ApiResult<web::Json<TokenPairResponse>> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)?;
    let pair = state.tokens.obtain_pair(&credentials).await?;
    Ok(web::Json(pair.into()))
}

/// Mint a new access credential from a live refresh credential.
#[utoipa::path(
    post,
    path = "/api/token/refresh/",
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "Access token", body = AccessResponse),
        (status = 401, description = "Invalid or expired token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "refreshToken",
    security([])
)]
#[post("/token/refresh/")]
pub async fn refresh_token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRefreshRequest>,
) -> ApiResult<web::Json<AccessResponse>> {
    let access = state.tokens.refresh(payload.refresh.trim()).await?;
    Ok(web::Json(AccessResponse { access }))
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/register/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation failed", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register/")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let registration = Registration::try_from_parts(
        &payload.email,
        &payload.password,
        &payload.confirm_password,
    )?;
    let account = state.accounts.register(&registration).await?;
    let pair = state.tokens.issue_for(&account).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        user: RegisteredUser {
            email: account.email.to_string(),
        },
        refresh: pair.refresh,
        access: pair.access,
    }))
}

/// Blacklist the caller's refresh credential.
///
/// Token failures are client errors here, so they surface as 400 rather
/// than 401.
#[utoipa::path(
    post,
    path = "/api/logout/",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = DetailResponse),
        (status = 400, description = "Missing, invalid, or already revoked token", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout/")]
pub async fn logout(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<LogoutRequest>,
) -> ApiResult<web::Json<DetailResponse>> {
    state
        .tokens
        .revoke(auth.caller(), payload.into_inner().refresh)
        .await
        .map_err(|err| match err.code() {
            ErrorCode::TokenInvalid => Error::invalid_request(INVALID_TOKEN_MESSAGE),
            _ => err,
        })?;
    Ok(web::Json(DetailResponse {
        detail: "Logout successful.".to_owned(),
    }))
}
