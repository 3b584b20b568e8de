//! Read-only access to uploaded images.
//!
//! ```text
//! GET /media/plants/<owner>/<uuid>.png
//! Authorization: Bearer <access>
//! ```
//!
//! Only the owner named in the path may read a file; anyone else gets 404.

use actix_web::http::header::{CacheControl, CacheDirective, ContentType};
use actix_web::{HttpResponse, get, web};

use crate::domain::{ApiResult, Error, ImagePath, content_type_for};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// URL prefix under which stored images are served.
pub const MEDIA_PREFIX: &str = "/media/";

/// Public URL of a stored image.
pub(crate) fn media_url(path: Option<&ImagePath>) -> Option<String> {
    path.map(|path| format!("{MEDIA_PREFIX}{path}"))
}

/// Serve a stored image.
#[utoipa::path(
    get,
    path = "/media/{path}",
    params(("path" = String, Path, description = "Storage-relative image path")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "No image of the caller's at this path", body = Error)
    ),
    tags = ["media"],
    operation_id = "getMedia"
)]
#[get("/media/{path:.*}")]
pub async fn get_media(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let path = ImagePath::new(path.into_inner());
    let content = state
        .media
        .fetch(auth.caller(), &path)
        .await?
        .ok_or_else(|| Error::not_found("media not found"))?;
    let content_type = content_type_for(&path)
        .parse()
        .map(ContentType)
        .unwrap_or_else(|_| ContentType::octet_stream());
    Ok(HttpResponse::Ok()
        .insert_header(content_type)
        .insert_header(CacheControl(vec![
            CacheDirective::Private,
            CacheDirective::MaxAge(3600),
        ]))
        .body(content))
}
