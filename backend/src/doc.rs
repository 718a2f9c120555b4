//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every REST endpoint and response schema so the
//! generated document can drive client codegen and contract checks.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::auth::{
    RegisterResponse, SendVerificationCodeRequest, VerifyCodeAndRegisterRequest,
};
use crate::inbound::http::social::{
    FavoriteRequest, FavoriteTourRequest, FavoriteTourResponse, FavoritesResponse, FollowResponse,
    FollowStatusResponse, MatchedProfileResponse, SwipeCandidateResponse, SwipeRequest,
    SwipeResponse,
};
use crate::inbound::http::users::{
    AccountResponse, DirectLoginRequest, DirectRegisterRequest, MessageResponse, PreferencesBody,
    UpdateProfileRequest, UpdateProfileResponse,
};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Wayfare backend API",
        description = "Identity, registration, and social-graph endpoints for the Wayfare travel-matching app."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::send_verification_code,
        crate::inbound::http::auth::verify_code_and_register,
        crate::inbound::http::users::sync_profile,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::get_user_by_id,
        crate::inbound::http::users::register_direct,
        crate::inbound::http::users::login_direct,
        crate::inbound::http::social::swipe_deck,
        crate::inbound::http::social::swipe,
        crate::inbound::http::social::get_matches,
        crate::inbound::http::social::follow,
        crate::inbound::http::social::unfollow,
        crate::inbound::http::social::follow_status,
        crate::inbound::http::social::toggle_favorite_package,
        crate::inbound::http::social::toggle_favorite_tour,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        AccountResponse,
        MessageResponse,
        UpdateProfileRequest,
        PreferencesBody,
        UpdateProfileResponse,
        DirectRegisterRequest,
        DirectLoginRequest,
        SendVerificationCodeRequest,
        VerifyCodeAndRegisterRequest,
        RegisterResponse,
        SwipeCandidateResponse,
        SwipeRequest,
        SwipeResponse,
        MatchedProfileResponse,
        FollowResponse,
        FollowStatusResponse,
        FavoriteRequest,
        FavoritesResponse,
        FavoriteTourRequest,
        FavoriteTourResponse,
    )),
    tags(
        (name = "auth", description = "Verification-code registration"),
        (name = "users", description = "Profiles and the legacy direct path"),
        (name = "social", description = "Swipes, matches, follows, favorites"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
