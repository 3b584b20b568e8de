//! Plant CRUD handlers, scoped to the caller's own plants.
//!
//! ```text
//! GET /plants/
//! POST /plants/ {"common_name":"Fern","scientific_name":"Polypodiopsida","habitat":"Forest"}
//! PATCH /plants/1/ {"habitat":"Bog"}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::fields::{FieldError, WriteMode};
use crate::domain::{ApiResult, Error, ImageKind, Plant, PlantChanges, PlantId};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::forms::FormPayload;
use crate::inbound::http::media::media_url;
use crate::inbound::http::state::HttpState;

/// Stored plant as returned to its owner.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PlantResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Fern")]
    pub common_name: String,
    #[schema(example = "Polypodiopsida")]
    pub scientific_name: String,
    #[schema(example = "Forest")]
    pub habitat: String,
    pub origin: Option<String>,
    pub description: Option<String>,
    /// URL of the stored photograph.
    pub plant_image: Option<String>,
    /// Owning account.
    pub created_by: Uuid,
}

impl From<&Plant> for PlantResponse {
    fn from(plant: &Plant) -> Self {
        Self {
            id: plant.id.get(),
            common_name: plant.common_name.clone(),
            scientific_name: plant.scientific_name.clone(),
            habitat: plant.habitat.clone(),
            origin: plant.origin.clone(),
            description: plant.description.clone(),
            plant_image: media_url(plant.plant_image.as_ref()),
            created_by: *plant.created_by.as_uuid(),
        }
    }
}

/// Plant fields accepted on create and update.
///
/// `common_name`, `scientific_name`, and `habitat` are required on `POST`
/// and `PUT`. `plant_image` must be a multipart file part.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct PlantRequest {
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
    pub habitat: Option<String>,
    pub origin: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub plant_image: Option<String>,
}

fn plant_changes(form: &FormPayload) -> Result<PlantChanges, FieldError> {
    Ok(PlantChanges {
        common_name: form.text("common_name")?,
        scientific_name: form.text("scientific_name")?,
        habitat: form.text("habitat")?,
        origin: form.nullable_text("origin")?,
        description: form.nullable_text("description")?,
        plant_image: form.image(ImageKind::Plant)?,
    })
}

async fn write_plant(
    state: &HttpState,
    auth: &Authenticated,
    id: PlantId,
    form: &FormPayload,
    mode: WriteMode,
) -> ApiResult<web::Json<PlantResponse>> {
    let changes = plant_changes(form)?;
    let plant = state
        .plants
        .update(auth.caller(), id, changes, mode)
        .await?;
    Ok(web::Json(PlantResponse::from(&plant)))
}

/// List the caller's plants.
#[utoipa::path(
    get,
    path = "/plants/",
    responses(
        (status = 200, description = "Plants", body = [PlantResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["plants"],
    operation_id = "listPlants"
)]
#[get("/plants/")]
pub async fn list_plants(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<Vec<PlantResponse>>> {
    let plants = state.plants.list(auth.caller()).await?;
    Ok(web::Json(plants.iter().map(PlantResponse::from).collect()))
}

/// Record a plant owned by the caller.
#[utoipa::path(
    post,
    path = "/plants/",
    request_body(content(
        (PlantRequest = "application/json"),
        (PlantRequest = "multipart/form-data")
    )),
    responses(
        (status = 201, description = "Plant created", body = PlantResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["plants"],
    operation_id = "createPlant"
)]
#[post("/plants/")]
pub async fn create_plant(
    state: web::Data<HttpState>,
    auth: Authenticated,
    form: FormPayload,
) -> ApiResult<HttpResponse> {
    let changes = plant_changes(&form)?;
    let plant = state.plants.create(auth.caller(), changes).await?;
    Ok(HttpResponse::Created().json(PlantResponse::from(&plant)))
}

/// Fetch one of the caller's plants.
#[utoipa::path(
    get,
    path = "/plants/{id}/",
    params(("id" = i64, Path, description = "Plant identifier")),
    responses(
        (status = 200, description = "Plant", body = PlantResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["plants"],
    operation_id = "getPlant"
)]
#[get("/plants/{id}/")]
pub async fn get_plant(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<web::Json<PlantResponse>> {
    let plant = state
        .plants
        .retrieve(auth.caller(), PlantId::new(path.into_inner()))
        .await?;
    Ok(web::Json(PlantResponse::from(&plant)))
}

/// Replace one of the caller's plants.
#[utoipa::path(
    put,
    path = "/plants/{id}/",
    params(("id" = i64, Path, description = "Plant identifier")),
    request_body(content(
        (PlantRequest = "application/json"),
        (PlantRequest = "multipart/form-data")
    )),
    responses(
        (status = 200, description = "Updated plant", body = PlantResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["plants"],
    operation_id = "replacePlant"
)]
#[put("/plants/{id}/")]
pub async fn replace_plant(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
    form: FormPayload,
) -> ApiResult<web::Json<PlantResponse>> {
    let id = PlantId::new(path.into_inner());
    write_plant(&state, &auth, id, &form, WriteMode::Replace).await
}

/// Partially update one of the caller's plants.
#[utoipa::path(
    patch,
    path = "/plants/{id}/",
    params(("id" = i64, Path, description = "Plant identifier")),
    request_body(content(
        (PlantRequest = "application/json"),
        (PlantRequest = "multipart/form-data")
    )),
    responses(
        (status = 200, description = "Updated plant", body = PlantResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["plants"],
    operation_id = "updatePlant"
)]
#[patch("/plants/{id}/")]
pub async fn update_plant(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
    form: FormPayload,
) -> ApiResult<web::Json<PlantResponse>> {
    let id = PlantId::new(path.into_inner());
    write_plant(&state, &auth, id, &form, WriteMode::Patch).await
}

/// Delete one of the caller's plants. Observations that referenced it
/// keep existing without a plant.
#[utoipa::path(
    delete,
    path = "/plants/{id}/",
    params(("id" = i64, Path, description = "Plant identifier")),
    responses(
        (status = 204, description = "Plant deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["plants"],
    operation_id = "deletePlant"
)]
#[delete("/plants/{id}/")]
pub async fn delete_plant(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .plants
        .delete(auth.caller(), PlantId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
