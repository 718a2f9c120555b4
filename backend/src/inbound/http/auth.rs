//! Registration endpoints.
//!
//! ```text
//! POST /auth/send-verification-code   {"email":"a@test.com"}
//! POST /auth/verify-code-and-register {"email":...,"password":...,"code":...,"name":...}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::RegistrationRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{AccountResponse, MessageResponse};
use crate::inbound::http::validation::{
    parse_display_name, parse_email, parse_password, require_non_empty,
};

/// Request body for `POST /auth/send-verification-code`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendVerificationCodeRequest {
    pub email: String,
}

/// Issue a verification code and email it to the address.
#[utoipa::path(
    post,
    path = "/auth/send-verification-code",
    request_body = SendVerificationCodeRequest,
    responses(
        (status = 200, description = "Code issued and emailed", body = MessageResponse),
        (status = 400, description = "Invalid email", body = crate::domain::Error),
        (status = 409, description = "Account already exists", body = crate::domain::Error),
        (status = 500, description = "Mail relay failure", body = crate::domain::Error)
    ),
    tags = ["auth"],
    operation_id = "sendVerificationCode",
    security([])
)]
#[post("/auth/send-verification-code")]
pub async fn send_verification_code(
    state: web::Data<HttpState>,
    payload: web::Json<SendVerificationCodeRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = parse_email(&payload.email)?;
    state.registration.request_code(email).await?;
    Ok(web::Json(MessageResponse {
        message: "Verification code sent to your email.".to_owned(),
    }))
}

/// Request body for `POST /auth/verify-code-and-register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VerifyCodeAndRegisterRequest {
    pub email: String,
    pub password: String,
    pub code: String,
    pub name: String,
}

/// Response for a completed registration.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user: AccountResponse,
    /// Provider custom sign-in token; the client exchanges it for a
    /// session without a second credential prompt.
    pub custom_token: String,
}

/// Validate the emailed code and complete registration.
#[utoipa::path(
    post,
    path = "/auth/verify-code-and-register",
    request_body = VerifyCodeAndRegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid or expired code, or invalid field", body = crate::domain::Error),
        (status = 409, description = "Email already registered", body = crate::domain::Error),
        (status = 500, description = "Identity provider failure", body = crate::domain::Error)
    ),
    tags = ["auth"],
    operation_id = "verifyCodeAndRegister",
    security([])
)]
#[post("/auth/verify-code-and-register")]
pub async fn verify_code_and_register(
    state: web::Data<HttpState>,
    payload: web::Json<VerifyCodeAndRegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let request = RegistrationRequest {
        email: parse_email(&payload.email)?,
        code: require_non_empty(&payload.code, "code")?.to_owned(),
        password: parse_password(&payload.password)?,
        display_name: parse_display_name(&payload.name)?,
    };

    let registered = state.registration.verify_and_register(request).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully!".to_owned(),
        user: registered.account.into(),
        custom_token: registered.custom_token,
    }))
}
