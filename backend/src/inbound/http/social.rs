//! Social graph endpoints: swipe deck, swipes, matches, follows, favorites.
//!
//! ```text
//! GET  /users                     swipe deck
//! POST /users/swipe               {"userId":...,"swipedUserId":...,"action":"right"}
//! GET  /users/matches
//! POST /users/{id}/follow, /users/{id}/unfollow
//! GET  /users/{id}/follow-status
//! PUT  /users/favorites           {"packageId":...}
//! POST /users/favorite-tours      {"tourId":...}
//! ```

use actix_web::{get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::account::Account;
use crate::domain::{Error, MatchedProfile, SwipeDirection, SwipeOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthenticatedAccount;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_account_id, require_non_empty};

/// Card shown in the swipe deck.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwipeCandidateResponse {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub profile_picture: String,
    #[schema(example = "genZ")]
    pub travel_type: String,
}

impl From<Account> for SwipeCandidateResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.display_name.to_string(),
            bio: account.bio,
            profile_picture: account.profile_picture,
            travel_type: account.travel_type.to_string(),
        }
    }
}

/// Accounts the caller has not yet evaluated.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Swipe candidates", body = [SwipeCandidateResponse]),
        (status = 401, description = "Unauthenticated", body = crate::domain::Error)
    ),
    tags = ["social"],
    operation_id = "swipeDeck"
)]
#[get("/users")]
pub async fn swipe_deck(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<SwipeCandidateResponse>>> {
    let deck = state.social.swipe_deck(auth.0.id).await?;
    Ok(web::Json(deck.into_iter().map(Into::into).collect()))
}

/// Request body for `POST /users/swipe`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwipeRequest {
    pub user_id: String,
    pub swiped_user_id: String,
    /// `left` or `right`.
    pub action: String,
}

/// Swipe outcome reported to the caller.
#[derive(Debug, Serialize, ToSchema)]
pub struct SwipeResponse {
    pub message: String,
    pub matched: bool,
}

/// Record a swipe and report whether it completed a match.
#[utoipa::path(
    post,
    path = "/users/swipe",
    request_body = SwipeRequest,
    responses(
        (status = 200, description = "Swipe recorded", body = SwipeResponse),
        (status = 400, description = "Invalid id or action", body = crate::domain::Error),
        (status = 403, description = "Body user id is not the caller", body = crate::domain::Error),
        (status = 404, description = "Unknown target", body = crate::domain::Error)
    ),
    tags = ["social"],
    operation_id = "swipe"
)]
#[post("/users/swipe")]
pub async fn swipe(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    payload: web::Json<SwipeRequest>,
) -> ApiResult<web::Json<SwipeResponse>> {
    let payload = payload.into_inner();
    let user_id = parse_account_id(&payload.user_id, "userId")?;
    if user_id != auth.0.id {
        return Err(Error::forbidden("You can only swipe as yourself."));
    }
    let target = parse_account_id(&payload.swiped_user_id, "swipedUserId")?;
    let direction: SwipeDirection = payload.action.parse().map_err(|()| {
        Error::invalid_request("action must be left or right")
            .with_details(serde_json::json!({ "field": "action", "code": "invalid_action" }))
    })?;

    let outcome = state.social.swipe(user_id, target, direction).await?;
    let (message, matched) = match outcome {
        SwipeOutcome::Matched => ("It's a match!", true),
        SwipeOutcome::Recorded => ("Swipe recorded", false),
    };
    Ok(web::Json(SwipeResponse {
        message: message.to_owned(),
        matched,
    }))
}

/// Matched account with display fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchedProfileResponse {
    pub id: String,
    pub name: String,
    pub profile_picture: String,
    pub bio: String,
}

impl From<MatchedProfile> for MatchedProfileResponse {
    fn from(profile: MatchedProfile) -> Self {
        Self {
            id: profile.id.to_string(),
            name: profile.name,
            profile_picture: profile.profile_picture,
            bio: profile.bio,
        }
    }
}

/// The caller's matches, expanded to display fields.
#[utoipa::path(
    get,
    path = "/users/matches",
    responses(
        (status = 200, description = "Matched profiles", body = [MatchedProfileResponse]),
        (status = 401, description = "Unauthenticated", body = crate::domain::Error)
    ),
    tags = ["social"],
    operation_id = "getMatches"
)]
#[get("/users/matches")]
pub async fn get_matches(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<MatchedProfileResponse>>> {
    let matches = state.social.matched_profiles(auth.0.id).await?;
    Ok(web::Json(matches.into_iter().map(Into::into).collect()))
}

/// Simple acknowledgement for follow mutations.
#[derive(Debug, Serialize, ToSchema)]
pub struct FollowResponse {
    pub message: String,
}

/// Follow another user.
#[utoipa::path(
    post,
    path = "/users/{id}/follow",
    params(("id" = String, Path, description = "Account to follow")),
    responses(
        (status = 200, description = "Followed", body = FollowResponse),
        (status = 404, description = "Unknown account", body = crate::domain::Error)
    ),
    tags = ["social"],
    operation_id = "followUser"
)]
#[post("/users/{id}/follow")]
pub async fn follow(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<FollowResponse>> {
    let target = parse_account_id(&path.into_inner(), "id")?;
    state.social.follow(auth.0.id, target).await?;
    Ok(web::Json(FollowResponse {
        message: "Followed successfully".to_owned(),
    }))
}

/// Unfollow another user. A no-op when not currently following.
#[utoipa::path(
    post,
    path = "/users/{id}/unfollow",
    params(("id" = String, Path, description = "Account to unfollow")),
    responses(
        (status = 200, description = "Unfollowed", body = FollowResponse),
        (status = 404, description = "Unknown account", body = crate::domain::Error)
    ),
    tags = ["social"],
    operation_id = "unfollowUser"
)]
#[post("/users/{id}/unfollow")]
pub async fn unfollow(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<FollowResponse>> {
    let target = parse_account_id(&path.into_inner(), "id")?;
    state.social.unfollow(auth.0.id, target).await?;
    Ok(web::Json(FollowResponse {
        message: "Unfollowed successfully".to_owned(),
    }))
}

/// Follow-status payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusResponse {
    pub is_following: bool,
}

/// Whether the caller follows the given account.
#[utoipa::path(
    get,
    path = "/users/{id}/follow-status",
    params(("id" = String, Path, description = "Account to check")),
    responses(
        (status = 200, description = "Follow status", body = FollowStatusResponse),
        (status = 404, description = "Unknown account", body = crate::domain::Error)
    ),
    tags = ["social"],
    operation_id = "followStatus"
)]
#[get("/users/{id}/follow-status")]
pub async fn follow_status(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<FollowStatusResponse>> {
    let target = parse_account_id(&path.into_inner(), "id")?;
    let is_following = state.social.follow_status(auth.0.id, target).await?;
    Ok(web::Json(FollowStatusResponse { is_following }))
}

/// Request body for `PUT /users/favorites`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub package_id: String,
}

/// Favorites after a package toggle.
#[derive(Debug, Serialize, ToSchema)]
pub struct FavoritesResponse {
    pub favorited: bool,
    pub favorites: Vec<String>,
}

/// Toggle a package in the caller's favorites.
#[utoipa::path(
    put,
    path = "/users/favorites",
    request_body = FavoriteRequest,
    responses(
        (status = 200, description = "Resulting favorites", body = FavoritesResponse),
        (status = 400, description = "Missing package id", body = crate::domain::Error)
    ),
    tags = ["social"],
    operation_id = "toggleFavoritePackage"
)]
#[put("/users/favorites")]
pub async fn toggle_favorite_package(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    payload: web::Json<FavoriteRequest>,
) -> ApiResult<web::Json<FavoritesResponse>> {
    let package_id = require_non_empty(&payload.package_id, "packageId")?;
    let update = state
        .social
        .toggle_favorite_package(auth.0.id, package_id)
        .await?;
    Ok(web::Json(FavoritesResponse {
        favorited: update.favorited,
        favorites: update.favorites,
    }))
}

/// Request body for `POST /users/favorite-tours`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteTourRequest {
    pub tour_id: String,
}

/// Result of a favorite-tour toggle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteTourResponse {
    pub message: String,
    pub is_favorited: bool,
}

/// Toggle a tour in the caller's favorite tours.
#[utoipa::path(
    post,
    path = "/users/favorite-tours",
    request_body = FavoriteTourRequest,
    responses(
        (status = 200, description = "Resulting membership", body = FavoriteTourResponse),
        (status = 400, description = "Missing tour id", body = crate::domain::Error)
    ),
    tags = ["social"],
    operation_id = "toggleFavoriteTour"
)]
#[post("/users/favorite-tours")]
pub async fn toggle_favorite_tour(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    payload: web::Json<FavoriteTourRequest>,
) -> ApiResult<web::Json<FavoriteTourResponse>> {
    let tour_id = require_non_empty(&payload.tour_id, "tourId")?;
    let favorited = state.social.toggle_favorite_tour(auth.0.id, tour_id).await?;
    let message = if favorited {
        "Tour favorited successfully."
    } else {
        "Tour unfavorited successfully."
    };
    Ok(web::Json(FavoriteTourResponse {
        message: message.to_owned(),
        is_favorited: favorited,
    }))
}
