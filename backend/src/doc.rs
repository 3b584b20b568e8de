//! OpenAPI documentation for the REST API.
//!
//! [`ApiDoc`] registers every handler under `inbound::http`, the request and
//! response DTOs, and the bearer token security scheme. Swagger UI serves it
//! in debug builds and `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Gender};
use crate::inbound::http::accounts::{AccountSummaryResponse, ProfileRequest, ProfileResponse};
use crate::inbound::http::observations::{ObservationRequest, ObservationResponse};
use crate::inbound::http::plants::{PlantRequest, PlantResponse};
use crate::inbound::http::tokens::{
    AccessResponse, DetailResponse, LogoutRequest, RegisterRequest, RegisterResponse,
    RegisteredUser, TokenObtainRequest, TokenPairResponse, TokenRefreshRequest,
};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerAuth";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /api/token/."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "GreenLeaf API",
        description = "Plant and observation records for signed-in accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::tokens::obtain_token,
        crate::inbound::http::tokens::refresh_token,
        crate::inbound::http::tokens::register,
        crate::inbound::http::tokens::logout,
        crate::inbound::http::accounts::get_profile,
        crate::inbound::http::accounts::replace_profile,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::accounts::delete_profile,
        crate::inbound::http::accounts::list_accounts,
        crate::inbound::http::plants::list_plants,
        crate::inbound::http::plants::create_plant,
        crate::inbound::http::plants::get_plant,
        crate::inbound::http::plants::replace_plant,
        crate::inbound::http::plants::update_plant,
        crate::inbound::http::plants::delete_plant,
        crate::inbound::http::observations::list_observations,
        crate::inbound::http::observations::create_observation,
        crate::inbound::http::observations::get_observation,
        crate::inbound::http::observations::replace_observation,
        crate::inbound::http::observations::update_observation,
        crate::inbound::http::observations::delete_observation,
        crate::inbound::http::media::get_media,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Gender,
        TokenObtainRequest,
        TokenPairResponse,
        TokenRefreshRequest,
        AccessResponse,
        RegisterRequest,
        RegisteredUser,
        RegisterResponse,
        LogoutRequest,
        DetailResponse,
        ProfileRequest,
        ProfileResponse,
        AccountSummaryResponse,
        PlantRequest,
        PlantResponse,
        ObservationRequest,
        ObservationResponse,
    )),
    tags(
        (name = "auth", description = "Registration, tokens, and logout"),
        (name = "accounts", description = "The caller's profile and the staff listing"),
        (name = "plants", description = "Plants recorded by the caller"),
        (name = "observations", description = "Field observations recorded by the caller"),
        (name = "media", description = "Uploaded images"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("PlantResponse", "common_name")]
    #[case("ObservationResponse", "related_plant")]
    #[case("RegisterResponse", "refresh")]
    fn schemas_expose_their_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }

    #[rstest]
    #[case("/api/token/")]
    #[case("/api/profile/")]
    #[case("/plants/{id}/")]
    #[case("/observations/")]
    #[case("/media/{path}")]
    fn documents_every_resource(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
