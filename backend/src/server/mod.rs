//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use greenleaf::Trace;
#[cfg(debug_assertions)]
use greenleaf::doc::ApiDoc;
use greenleaf::inbound::http::configure;
use greenleaf::inbound::http::health::{HealthState, live, ready};
use greenleaf::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind an Actix HTTP server for `config` and mark it ready.
///
/// The returned [`Server`] must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when the media root cannot be opened or the
/// socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config)?);
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use greenleaf::composition::{Adapters, TokenSettings};
    use greenleaf::domain::TokenLifetimes;
    use greenleaf::outbound::jwt::{JwtCodec, SigningKey};
    use greenleaf::outbound::storage::FsImageStore;
    use rstest::rstest;

    fn deps(media: &tempfile::TempDir) -> AppDependencies {
        let images = FsImageStore::open(media.path()).expect("media root");
        let tokens = TokenSettings {
            codec: Arc::new(JwtCodec::new(&SigningKey::from_bytes(vec![9; 32]))),
            clock: Arc::new(mockable::DefaultClock),
            lifetimes: TokenLifetimes::default(),
        };
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(Adapters::in_memory(images).into_http_state(tokens)),
        }
    }

    #[rstest]
    #[case("/health/live", StatusCode::OK)]
    #[case("/health/ready", StatusCode::SERVICE_UNAVAILABLE)]
    #[case("/plants/", StatusCode::UNAUTHORIZED)]
    #[case("/api/profile/", StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn routes_are_mounted(#[case] uri: &str, #[case] expected: StatusCode) {
        let media = tempfile::tempdir().expect("tempdir");
        let app = test::init_service(build_app(deps(&media))).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), expected);
        assert!(res.headers().contains_key("trace-id"));
    }

    #[cfg(debug_assertions)]
    #[rstest]
    #[actix_web::test]
    async fn serves_the_openapi_document() {
        let media = tempfile::tempdir().expect("tempdir");
        let app = test::init_service(build_app(deps(&media))).await;
        let req = test::TestRequest::get()
            .uri("/api-docs/openapi.json")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
