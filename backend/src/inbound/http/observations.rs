//! Observation CRUD handlers, scoped to the caller's own observations.
//!
//! Reads nest the related plant in full; writes reference it through the
//! write-only `related_plant_id`.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::fields::{FieldError, WriteMode};
use crate::domain::{
    ApiResult, Error, ImageKind, Observation, ObservationChanges, ObservationId,
};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::forms::FormPayload;
use crate::inbound::http::media::media_url;
use crate::inbound::http::plants::PlantResponse;
use crate::inbound::http::state::HttpState;

/// Stored observation as returned to its owner.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ObservationResponse {
    #[schema(example = 1)]
    pub id: i64,
    /// URL of the stored photograph.
    pub observation_image: Option<String>,
    /// The observed plant, if any.
    pub related_plant: Option<PlantResponse>,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "14:45:00")]
    pub time: NaiveTime,
    #[schema(example = "Kew")]
    pub location: String,
    pub note: Option<String>,
    /// Owning account.
    pub created_by: Uuid,
}

impl From<&Observation> for ObservationResponse {
    fn from(observation: &Observation) -> Self {
        Self {
            id: observation.id.get(),
            observation_image: media_url(observation.observation_image.as_ref()),
            related_plant: observation.related_plant.as_ref().map(PlantResponse::from),
            date: observation.date,
            time: observation.time,
            location: observation.location.clone(),
            note: observation.note.clone(),
            created_by: *observation.created_by.as_uuid(),
        }
    }
}

/// Observation fields accepted on create and update.
///
/// `location` is required on `POST` and `PUT`. `date` and `time` default to
/// the current day and time on create. `related_plant_id` must name one of
/// the caller's plants; `null` clears the relation.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ObservationRequest {
    pub location: Option<String>,
    pub note: Option<String>,
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "14:45:00")]
    pub time: Option<NaiveTime>,
    pub related_plant_id: Option<i64>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub observation_image: Option<String>,
}

fn observation_changes(form: &FormPayload) -> Result<ObservationChanges, FieldError> {
    Ok(ObservationChanges {
        location: form.text("location")?,
        note: form.nullable_text("note")?,
        date: form.date("date")?,
        time: form.time("time")?,
        related_plant_id: form.plant_id("related_plant_id")?,
        observation_image: form.image(ImageKind::Observation)?,
    })
}

async fn write_observation(
    state: &HttpState,
    auth: &Authenticated,
    id: ObservationId,
    form: &FormPayload,
    mode: WriteMode,
) -> ApiResult<web::Json<ObservationResponse>> {
    let changes = observation_changes(form)?;
    let observation = state
        .observations
        .update(auth.caller(), id, changes, mode)
        .await?;
    Ok(web::Json(ObservationResponse::from(&observation)))
}

/// List the caller's observations.
#[utoipa::path(
    get,
    path = "/observations/",
    responses(
        (status = 200, description = "Observations", body = [ObservationResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["observations"],
    operation_id = "listObservations"
)]
#[get("/observations/")]
pub async fn list_observations(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<Vec<ObservationResponse>>> {
    let observations = state.observations.list(auth.caller()).await?;
    Ok(web::Json(
        observations.iter().map(ObservationResponse::from).collect(),
    ))
}

/// Record an observation owned by the caller.
#[utoipa::path(
    post,
    path = "/observations/",
    request_body(content(
        (ObservationRequest = "application/json"),
        (ObservationRequest = "multipart/form-data")
    )),
    responses(
        (status = 201, description = "Observation created", body = ObservationResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["observations"],
    operation_id = "createObservation"
)]
#[post("/observations/")]
pub async fn create_observation(
    state: web::Data<HttpState>,
    auth: Authenticated,
    form: FormPayload,
) -> ApiResult<HttpResponse> {
    let changes = observation_changes(&form)?;
    let observation = state.observations.create(auth.caller(), changes).await?;
    Ok(HttpResponse::Created().json(ObservationResponse::from(&observation)))
}

/// Fetch one of the caller's observations.
#[utoipa::path(
    get,
    path = "/observations/{id}/",
    params(("id" = i64, Path, description = "Observation identifier")),
    responses(
        (status = 200, description = "Observation", body = ObservationResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["observations"],
    operation_id = "getObservation"
)]
#[get("/observations/{id}/")]
pub async fn get_observation(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ObservationResponse>> {
    let observation = state
        .observations
        .retrieve(auth.caller(), ObservationId::new(path.into_inner()))
        .await?;
    Ok(web::Json(ObservationResponse::from(&observation)))
}

/// Replace one of the caller's observations.
#[utoipa::path(
    put,
    path = "/observations/{id}/",
    params(("id" = i64, Path, description = "Observation identifier")),
    request_body(content(
        (ObservationRequest = "application/json"),
        (ObservationRequest = "multipart/form-data")
    )),
    responses(
        (status = 200, description = "Updated observation", body = ObservationResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["observations"],
    operation_id = "replaceObservation"
)]
#[put("/observations/{id}/")]
pub async fn replace_observation(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
    form: FormPayload,
) -> ApiResult<web::Json<ObservationResponse>> {
    let id = ObservationId::new(path.into_inner());
    write_observation(&state, &auth, id, &form, WriteMode::Replace).await
}

/// Partially update one of the caller's observations.
#[utoipa::path(
    patch,
    path = "/observations/{id}/",
    params(("id" = i64, Path, description = "Observation identifier")),
    request_body(content(
        (ObservationRequest = "application/json"),
        (ObservationRequest = "multipart/form-data")
    )),
    responses(
        (status = 200, description = "Updated observation", body = ObservationResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["observations"],
    operation_id = "updateObservation"
)]
#[patch("/observations/{id}/")]
pub async fn update_observation(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
    form: FormPayload,
) -> ApiResult<web::Json<ObservationResponse>> {
    let id = ObservationId::new(path.into_inner());
    write_observation(&state, &auth, id, &form, WriteMode::Patch).await
}

/// Delete one of the caller's observations.
#[utoipa::path(
    delete,
    path = "/observations/{id}/",
    params(("id" = i64, Path, description = "Observation identifier")),
    responses(
        (status = 204, description = "Observation deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["observations"],
    operation_id = "deleteObservation"
)]
#[delete("/observations/{id}/")]
pub async fn delete_observation(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .observations
        .delete(auth.caller(), ObservationId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
