//! Bearer-token session gate.
//!
//! Every protected handler takes [`AuthenticatedAccount`] as an extractor:
//! the token is pulled from the `Authorization` header, verified with the
//! identity provider, and resolved to a local account before the handler
//! body runs. Failures surface as 401 with a machine-readable detail code.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::json;

use crate::domain::Error;
use crate::domain::account::Account;
use crate::domain::ports::{IdentityProviderError, VerifiedIdentity};
use crate::inbound::http::state::HttpState;

/// Raw bearer token extracted from the `Authorization` header.
pub struct BearerToken(String);

impl BearerToken {
    /// The token string without the `Bearer ` prefix.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn from_http_request(req: &HttpRequest) -> Result<Self, Error> {
        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let Some(token) = header.and_then(|value| value.strip_prefix("Bearer ")) else {
            return Err(Error::unauthorized("No token, authorization denied")
                .with_details(json!({ "code": "no_token" })));
        };
        if token.is_empty() {
            return Err(Error::unauthorized("No token, authorization denied")
                .with_details(json!({ "code": "no_token" })));
        }
        Ok(Self(token.to_owned()))
    }
}

impl FromRequest for BearerToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

/// Map provider token failures to the 401 taxonomy, keeping the expired
/// sub-case distinguishable for clients.
pub(crate) fn map_token_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::TokenExpired => {
            Error::unauthorized("Token expired. Please re-authenticate.")
                .with_details(json!({ "code": "token_expired" }))
        }
        IdentityProviderError::InvalidToken { message } => {
            Error::unauthorized("Invalid authentication token")
                .with_details(json!({ "code": "invalid_token", "reason": message }))
        }
        other => Error::upstream(format!("token verification failed: {other}")),
    }
}

/// Verify a bearer token against the identity provider.
pub(crate) async fn verify_token(
    state: &HttpState,
    token: &BearerToken,
) -> Result<VerifiedIdentity, Error> {
    state
        .identity
        .verify_id_token(token.as_str())
        .await
        .map_err(map_token_error)
}

/// The local account resolved from a verified bearer token.
pub struct AuthenticatedAccount(pub Account);

impl AuthenticatedAccount {
    async fn resolve(req: HttpRequest) -> Result<Self, Error> {
        let token = BearerToken::from_http_request(&req)?;
        let state = req
            .app_data::<web::Data<HttpState>>()
            .cloned()
            .ok_or_else(|| Error::internal("HttpState is not configured"))?;

        let identity = verify_token(&state, &token).await?;
        let account = state
            .accounts
            .find_by_provider_id(&identity.uid)
            .await
            .map_err(|error| Error::internal(format!("account lookup failed: {error}")))?;
        account.map(Self).ok_or_else(|| {
            Error::unauthorized(
                "User profile not found. Complete POST /users/profile first.",
            )
            .with_details(json!({ "code": "profile_not_linked" }))
        })
    }
}

impl FromRequest for AuthenticatedAccount {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(Self::resolve(req))
    }
}
