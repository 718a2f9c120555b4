//! Server wiring: route registration shared by `main` and the HTTP tests.

pub mod config;

use actix_web::web;

use crate::domain::Error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{auth, health, social, users};

/// Register every route and attach the shared state.
///
/// Fixed-path `/users/...` routes are registered before the parameterised
/// `/users/{id}` routes so `profile`, `matches`, and `swipe` are not
/// shadowed by the id matcher.
pub fn configure_app(
    state: web::Data<HttpState>,
    health_state: web::Data<health::HealthState>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        // Malformed JSON payloads surface in the same structured envelope
        // as every other failure.
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| Error::invalid_request(err.to_string()).into());
        cfg.app_data(json_config)
            .app_data(state)
            .app_data(health_state)
            .service(auth::send_verification_code)
            .service(auth::verify_code_and_register)
            .service(users::register_direct)
            .service(users::login_direct)
            .service(users::sync_profile)
            .service(users::get_profile)
            .service(users::update_profile)
            .service(social::swipe_deck)
            .service(social::swipe)
            .service(social::get_matches)
            .service(social::toggle_favorite_package)
            .service(social::toggle_favorite_tour)
            .service(social::follow)
            .service(social::unfollow)
            .service(social::follow_status)
            .service(users::get_user_by_id)
            .service(health::ready)
            .service(health::live);
    }
}
