//! Profile and account endpoints.
//!
//! ```text
//! POST /users/profile            find-or-create from a verified token
//! GET  /users/profile            caller's account
//! PUT  /users/profile            partial profile update
//! GET  /users/{id}               profile by id
//! POST /users/register, /login   legacy direct path
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::account::Account;
use crate::domain::{LoginCredentials, ProfileUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::{AuthenticatedAccount, BearerToken, verify_token};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_display_name, parse_email, parse_password, parse_travel_type,
};

/// Account representation returned by every profile-shaped endpoint.
/// The password hash never leaves the domain.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub profile_picture: String,
    #[schema(example = "family")]
    pub travel_type: String,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub matched_users: Vec<String>,
    pub swiped_users: Vec<String>,
    pub favorites: Vec<String>,
    pub favorite_tours: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

fn ids_to_strings(ids: &std::collections::BTreeSet<crate::domain::AccountId>) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            provider_id: account.provider_id.clone(),
            name: account.display_name.to_string(),
            email: account.email.to_string(),
            bio: account.bio.clone(),
            profile_picture: account.profile_picture.clone(),
            travel_type: account.travel_type.to_string(),
            followers: ids_to_strings(&account.followers),
            following: ids_to_strings(&account.following),
            matched_users: ids_to_strings(&account.matched_users),
            swiped_users: ids_to_strings(&account.swiped_users),
            favorites: account.favorites.iter().cloned().collect(),
            favorite_tours: account.favorite_tours.iter().cloned().collect(),
            created_at: account.created_at.to_rfc3339(),
            updated_at: account.updated_at.to_rfc3339(),
        }
    }
}

/// Simple message acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Find-or-create the local account for the verified bearer identity.
///
/// This is the one token-protected endpoint that does not require an
/// existing local account: it is how the account gets linked.
#[utoipa::path(
    post,
    path = "/users/profile",
    responses(
        (status = 200, description = "Local account for the verified identity", body = AccountResponse),
        (status = 401, description = "Missing or invalid token", body = crate::domain::Error),
        (status = 409, description = "Email already linked elsewhere", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "syncProfile"
)]
#[post("/users/profile")]
pub async fn sync_profile(
    token: BearerToken,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<AccountResponse>> {
    let identity = verify_token(&state, &token).await?;
    let account = state.profiles.sync_identity(identity).await?;
    Ok(web::Json(account.into()))
}

/// Return the caller's account.
#[utoipa::path(
    get,
    path = "/users/profile",
    responses(
        (status = 200, description = "Caller's account", body = AccountResponse),
        (status = 401, description = "Unauthenticated", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/users/profile")]
pub async fn get_profile(auth: AuthenticatedAccount) -> ApiResult<web::Json<AccountResponse>> {
    Ok(web::Json(auth.0.into()))
}

/// Request body for `PUT /users/profile`; absent fields stay untouched.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub preferences: Option<PreferencesBody>,
    /// Empty string clears the picture.
    pub profile_picture: Option<String>,
}

/// Nested preferences payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesBody {
    pub travel_type: Option<String>,
}

/// Response for a successful profile update.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: AccountResponse,
}

/// Apply a partial update to the caller's profile.
#[utoipa::path(
    put,
    path = "/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = UpdateProfileResponse),
        (status = 400, description = "Invalid field", body = crate::domain::Error),
        (status = 401, description = "Unauthenticated", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/profile")]
pub async fn update_profile(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<UpdateProfileResponse>> {
    let payload = payload.into_inner();
    let mut update = ProfileUpdate {
        bio: payload.bio,
        profile_picture: payload.profile_picture,
        ..ProfileUpdate::default()
    };
    if let Some(name) = payload.name.as_deref() {
        update.display_name = Some(parse_display_name(name)?);
    }
    if let Some(travel_type) = payload
        .preferences
        .as_ref()
        .and_then(|prefs| prefs.travel_type.as_deref())
    {
        update.travel_type = Some(parse_travel_type(travel_type)?);
    }

    let account = state.profiles.update_profile(auth.0.id, update).await?;
    Ok(web::Json(UpdateProfileResponse {
        message: "Profile updated successfully".to_owned(),
        user: account.into(),
    }))
}

/// Fetch another user's profile by id.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 404, description = "Unknown account", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "getUserById"
)]
#[get("/users/{id}")]
pub async fn get_user_by_id(
    _auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<AccountResponse>> {
    let id = crate::inbound::http::validation::parse_account_id(&path.into_inner(), "id")?;
    let account = state.profiles.profile(id).await?;
    Ok(web::Json(account.into()))
}

/// Request body for the legacy direct registration.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DirectRegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Legacy direct registration: local-only account, hashed password.
#[utoipa::path(
    post,
    path = "/users/register",
    request_body = DirectRegisterRequest,
    responses(
        (status = 201, description = "Account created", body = MessageResponse),
        (status = 400, description = "Invalid field", body = crate::domain::Error),
        (status = 409, description = "Email already registered", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "registerDirect",
    security([])
)]
#[post("/users/register")]
pub async fn register_direct(
    state: web::Data<HttpState>,
    payload: web::Json<DirectRegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = parse_email(&payload.email)?;
    let password = parse_password(&payload.password)?;
    let name = parse_display_name(&payload.name)?;
    state.profiles.register_direct(email, password, name).await?;
    Ok(HttpResponse::Created().json(MessageResponse {
        message: "User registered successfully".to_owned(),
    }))
}

/// Request body for the legacy direct login.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DirectLoginRequest {
    pub email: String,
    pub password: String,
}

/// Legacy direct login: verifies the password against the stored hash.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = DirectLoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = crate::domain::Error)
    ),
    tags = ["users"],
    operation_id = "loginDirect",
    security([])
)]
#[post("/users/login")]
pub async fn login_direct(
    state: web::Data<HttpState>,
    payload: web::Json<DirectLoginRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let payload = payload.into_inner();
    let credentials =
        LoginCredentials::new(parse_email(&payload.email)?, parse_password(&payload.password)?);
    state.profiles.login_direct(&credentials).await?;
    Ok(web::Json(MessageResponse {
        message: "User logged in successfully".to_owned(),
    }))
}
