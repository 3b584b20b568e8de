//! HTTP inbound adapter exposing the REST endpoints.
//!
//! Account and token endpoints sit under `/api`; plants, observations, and
//! media are mounted at the root. Health probes are registered by the server
//! alongside its readiness state.

use actix_web::web;

pub mod accounts;
pub mod auth;
pub mod error;
pub mod forms;
pub mod health;
pub mod media;
pub mod observations;
pub mod plants;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tokens;

pub use crate::domain::ApiResult;

/// Register every resource endpoint and the JSON extractor settings.
///
/// Handlers expect a `web::Data<HttpState>` registered on the app.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use greenleaf::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// # drop(app);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    let api = web::scope("/api")
        .service(tokens::obtain_token)
        .service(tokens::refresh_token)
        .service(tokens::register)
        .service(tokens::logout)
        .service(accounts::get_profile)
        .service(accounts::replace_profile)
        .service(accounts::update_profile)
        .service(accounts::delete_profile)
        .service(accounts::list_accounts);

    cfg.app_data(error::json_config())
        .service(api)
        .service(plants::list_plants)
        .service(plants::create_plant)
        .service(plants::get_plant)
        .service(plants::replace_plant)
        .service(plants::update_plant)
        .service(plants::delete_plant)
        .service(observations::list_observations)
        .service(observations::create_observation)
        .service(observations::get_observation)
        .service(observations::replace_observation)
        .service(observations::update_observation)
        .service(observations::delete_observation)
        .service(media::get_media);
}
