//! Profile and account listing handlers.
//!
//! ```text
//! GET /api/profile/
//! PATCH /api/profile/ {"first_name":"Ada","gender":"Female"}
//! GET /api/users/list/
//! ```

use actix_web::{HttpResponse, delete, get, patch, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::fields::FieldError;
use crate::domain::{Account, AccountSummary, ApiResult, Error, Gender, ImageKind, ProfileChanges};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::forms::FormPayload;
use crate::inbound::http::media::media_url;
use crate::inbound::http::state::HttpState;

/// Profile of the calling account.
///
/// `email` and the permission flags are read-only.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[schema(example = "a@x.com")]
    pub email: String,
    pub phone_number: Option<String>,
    /// URL of the stored avatar.
    #[schema(example = "/media/users/3fa85f64-5717-4562-b3fc-2c963f66afa6/0a1b.png")]
    pub profile_image: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl From<&Account> for ProfileResponse {
    fn from(account: &Account) -> Self {
        let profile = &account.profile;
        Self {
            id: *account.id.as_uuid(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            birthdate: profile.birthdate,
            gender: profile.gender,
            email: account.email.to_string(),
            phone_number: profile.phone_number.clone(),
            profile_image: media_url(profile.profile_image.as_ref()),
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
            is_active: account.is_active,
        }
    }
}

/// Editable profile fields, sent as JSON or multipart.
///
/// Every field is optional; `null` clears it. `profile_image` must be a
/// multipart file part.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone_number: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub profile_image: Option<String>,
}

/// Row of the staff-only account listing.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AccountSummaryResponse {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub total_plant_record: u64,
    pub total_observation_records: u64,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl From<AccountSummary> for AccountSummaryResponse {
    fn from(summary: AccountSummary) -> Self {
        Self {
            id: *summary.id.as_uuid(),
            first_name: summary.first_name,
            last_name: summary.last_name,
            email: summary.email.to_string(),
            total_plant_record: summary.total_plant_record,
            total_observation_records: summary.total_observation_records,
            is_staff: summary.is_staff,
            is_superuser: summary.is_superuser,
        }
    }
}

fn profile_changes(form: &FormPayload) -> Result<ProfileChanges, FieldError> {
    Ok(ProfileChanges {
        first_name: form.nullable_text("first_name")?,
        last_name: form.nullable_text("last_name")?,
        birthdate: form.nullable_date("birthdate")?,
        gender: form.gender("gender")?,
        phone_number: form.nullable_text("phone_number")?,
        profile_image: form.image(ImageKind::Profile)?,
    })
}

async fn apply_profile(
    state: &HttpState,
    auth: &Authenticated,
    form: &FormPayload,
) -> ApiResult<web::Json<ProfileResponse>> {
    let changes = profile_changes(form)?;
    let account = state.accounts.update_profile(auth.caller(), changes).await?;
    Ok(web::Json(ProfileResponse::from(&account)))
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/profile/",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "getProfile"
)]
#[get("/profile/")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<ProfileResponse>> {
    let account = state.accounts.profile(auth.caller()).await?;
    Ok(web::Json(ProfileResponse::from(&account)))
}

/// Update the caller's profile.
#[utoipa::path(
    put,
    path = "/api/profile/",
    request_body(content(
        (ProfileRequest = "application/json"),
        (ProfileRequest = "multipart/form-data")
    )),
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "replaceProfile"
)]
#[put("/profile/")]
pub async fn replace_profile(
    state: web::Data<HttpState>,
    auth: Authenticated,
    form: FormPayload,
) -> ApiResult<web::Json<ProfileResponse>> {
    apply_profile(&state, &auth, &form).await
}

/// Partially update the caller's profile.
#[utoipa::path(
    patch,
    path = "/api/profile/",
    request_body(content(
        (ProfileRequest = "application/json"),
        (ProfileRequest = "multipart/form-data")
    )),
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "updateProfile"
)]
#[patch("/profile/")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    auth: Authenticated,
    form: FormPayload,
) -> ApiResult<web::Json<ProfileResponse>> {
    apply_profile(&state, &auth, &form).await
}

/// Delete the caller's account with its plants and observations.
#[utoipa::path(
    delete,
    path = "/api/profile/",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "deleteProfile"
)]
#[delete("/profile/")]
pub async fn delete_profile(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    state.accounts.delete_account(auth.caller()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List every account with its record counts. Staff only.
#[utoipa::path(
    get,
    path = "/api/users/list/",
    responses(
        (status = 200, description = "Accounts", body = [AccountSummaryResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "listAccounts"
)]
#[get("/users/list/")]
pub async fn list_accounts(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<Vec<AccountSummaryResponse>>> {
    let summaries = state.accounts.list_accounts(auth.caller()).await?;
    Ok(web::Json(
        summaries
            .into_iter()
            .map(AccountSummaryResponse::from)
            .collect(),
    ))
}
