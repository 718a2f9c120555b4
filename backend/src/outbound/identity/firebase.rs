//! Reqwest-backed identity provider adapter.
//!
//! Talks to a Firebase-compatible Identity Toolkit REST surface. Admin
//! operations (account lookup/create/delete, token verification) run under
//! an OAuth bearer obtained through the service-account JWT grant; custom
//! sign-in tokens are minted locally with the same key. This adapter owns
//! transport only: request serialisation, timeout and status mapping, and
//! decoding into the port types.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

use crate::domain::account::Email;
use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, NewProviderAccount, ProviderAccount,
    VerifiedIdentity,
};

const DEFAULT_API_BASE: &str = "https://identitytoolkit.googleapis.com/v1/";
const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/identitytoolkit";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
// Audience Firebase expects on custom sign-in tokens.
const CUSTOM_TOKEN_AUDIENCE: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";
const TOKEN_LIFETIME_SECONDS: i64 = 3600;
// Refresh the cached OAuth bearer a minute before it actually expires.
const TOKEN_REFRESH_MARGIN_SECONDS: i64 = 60;

/// Service-account credentials as issued by the provider console.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
}

impl ServiceAccountKey {
    /// Parse the provider's JSON key file.
    pub fn from_json(bytes: &[u8]) -> Result<Self, FirebaseInitError> {
        serde_json::from_slice(bytes).map_err(|error| FirebaseInitError::InvalidKey {
            message: error.to_string(),
        })
    }
}

/// Failures constructing the adapter.
#[derive(Debug, thiserror::Error)]
pub enum FirebaseInitError {
    #[error("service account key is invalid: {message}")]
    InvalidKey { message: String },
    #[error("identity endpoint URL is invalid: {message}")]
    InvalidEndpoint { message: String },
    #[error("HTTP client construction failed: {0}")]
    Http(#[from] reqwest::Error),
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Identity provider adapter over the Identity Toolkit REST API.
pub struct FirebaseIdentityProvider {
    client: Client,
    api_base: Url,
    token_endpoint: Url,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached_token: Mutex<Option<CachedToken>>,
}

impl FirebaseIdentityProvider {
    /// Build an adapter with an explicit request timeout.
    pub fn new(key: ServiceAccountKey, timeout: Duration) -> Result<Self, FirebaseInitError> {
        let api_base = Url::parse(DEFAULT_API_BASE).map_err(|error| {
            FirebaseInitError::InvalidEndpoint {
                message: error.to_string(),
            }
        })?;
        let token_endpoint = Url::parse(DEFAULT_TOKEN_ENDPOINT).map_err(|error| {
            FirebaseInitError::InvalidEndpoint {
                message: error.to_string(),
            }
        })?;
        Self::with_endpoints(key, timeout, api_base, token_endpoint)
    }

    /// Build an adapter against explicit endpoints (used against emulators).
    pub fn with_endpoints(
        key: ServiceAccountKey,
        timeout: Duration,
        api_base: Url,
        token_endpoint: Url,
    ) -> Result<Self, FirebaseInitError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(
            |error| FirebaseInitError::InvalidKey {
                message: error.to_string(),
            },
        )?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base,
            token_endpoint,
            key,
            encoding_key,
            cached_token: Mutex::new(None),
        })
    }

    fn accounts_url(&self, suffix: &str) -> Result<Url, IdentityProviderError> {
        self.api_base
            .join(&format!(
                "projects/{project}/accounts{suffix}",
                project = self.key.project_id
            ))
            .map_err(|error| IdentityProviderError::Upstream {
                message: format!("invalid accounts endpoint: {error}"),
            })
    }

    fn sign(&self, claims: &impl Serialize) -> Result<String, IdentityProviderError> {
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &self.encoding_key)
            .map_err(|error| IdentityProviderError::Upstream {
                message: format!("failed to sign service token: {error}"),
            })
    }

    async fn access_token(&self) -> Result<String, IdentityProviderError> {
        let now = Utc::now();
        {
            let cached = self
                .cached_token
                .lock()
                .map_err(|_| IdentityProviderError::Upstream {
                    message: "token cache lock poisoned".to_owned(),
                })?;
            if let Some(token) = cached.as_ref()
                && token.expires_at
                    > now + chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECONDS)
            {
                return Ok(token.token.clone());
            }
        }

        let assertion = self.sign(&OauthClaims {
            iss: &self.key.client_email,
            scope: OAUTH_SCOPE,
            aud: self.token_endpoint.as_str(),
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECONDS,
        })?;
        let response = self
            .client
            .post(self.token_endpoint.clone())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(classify_failure(status, body.as_ref()));
        }
        let token: OauthTokenDto =
            serde_json::from_slice(body.as_ref()).map_err(map_decode_error)?;

        let mut cached = self
            .cached_token
            .lock()
            .map_err(|_| IdentityProviderError::Upstream {
                message: "token cache lock poisoned".to_owned(),
            })?;
        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at: now + chrono::Duration::seconds(token.expires_in),
        });
        Ok(token.access_token)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &Value,
    ) -> Result<T, IdentityProviderError> {
        let bearer = self.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(classify_failure(status, bytes.as_ref()));
        }
        serde_json::from_slice(bytes.as_ref()).map_err(map_decode_error)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<ProviderAccount>, IdentityProviderError> {
        let url = self.accounts_url(":lookup")?;
        let response: LookupResponseDto = self
            .post_json(url, &json!({ "email": [email.as_ref()] }))
            .await?;
        Ok(response
            .users
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(UserRecordDto::into_provider_account))
    }

    async fn create_account(
        &self,
        account: NewProviderAccount,
    ) -> Result<ProviderAccount, IdentityProviderError> {
        let url = self.accounts_url("")?;
        let record: UserRecordDto = self
            .post_json(
                url,
                &json!({
                    "email": account.email.as_ref(),
                    "password": account.password.expose(),
                    "displayName": account.display_name.as_ref(),
                    "emailVerified": account.email_verified,
                }),
            )
            .await?;
        Ok(record.into_provider_account())
    }

    async fn delete_account(&self, uid: &str) -> Result<(), IdentityProviderError> {
        let url = self.accounts_url(":delete")?;
        let _: Value = self.post_json(url, &json!({ "localId": uid })).await?;
        Ok(())
    }

    async fn verify_id_token(
        &self,
        token: &str,
    ) -> Result<VerifiedIdentity, IdentityProviderError> {
        let url = self.accounts_url(":lookup")?;
        let response: LookupResponseDto =
            self.post_json(url, &json!({ "idToken": token })).await?;
        let record = response
            .users
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| IdentityProviderError::InvalidToken {
                message: "token resolved to no account".to_owned(),
            })?;
        Ok(VerifiedIdentity {
            uid: record.local_id,
            email: record.email.and_then(|raw| Email::new(raw).ok()),
            display_name: record.display_name,
        })
    }

    async fn issue_custom_token(&self, uid: &str) -> Result<String, IdentityProviderError> {
        let now = Utc::now();
        self.sign(&CustomTokenClaims {
            iss: &self.key.client_email,
            sub: &self.key.client_email,
            aud: CUSTOM_TOKEN_AUDIENCE,
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECONDS,
            uid,
        })
    }
}

#[derive(Serialize)]
struct OauthClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Serialize)]
struct CustomTokenClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
    uid: &'a str,
}

#[derive(Debug, Deserialize)]
struct OauthTokenDto {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponseDto {
    users: Option<Vec<UserRecordDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecordDto {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

impl UserRecordDto {
    fn into_provider_account(self) -> ProviderAccount {
        ProviderAccount {
            uid: self.local_id,
            email: self.email.and_then(|raw| Email::new(raw).ok()),
            display_name: self.display_name,
            email_verified: self.email_verified,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::Upstream {
        message: if error.is_timeout() {
            "identity provider request timed out".to_owned()
        } else {
            format!("identity provider transport error: {error}")
        },
    }
}

fn map_decode_error(error: serde_json::Error) -> IdentityProviderError {
    IdentityProviderError::Upstream {
        message: format!("invalid identity provider response: {error}"),
    }
}

/// Classify a non-2xx provider response by its error reason.
fn classify_failure(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    let reason = serde_json::from_slice::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_default();
    classify_reason(&reason).unwrap_or_else(|| IdentityProviderError::Upstream {
        message: format!(
            "identity provider returned {status}: {reason}",
            reason = if reason.is_empty() { "<no reason>" } else { reason.as_str() }
        ),
    })
}

fn classify_reason(reason: &str) -> Option<IdentityProviderError> {
    // Reasons may carry a suffix, e.g. "WEAK_PASSWORD : Password should be
    // at least 6 characters".
    let head = reason.split_whitespace().next().unwrap_or_default();
    match head {
        "EMAIL_EXISTS" | "DUPLICATE_EMAIL" => Some(IdentityProviderError::EmailAlreadyInUse),
        "INVALID_EMAIL" | "MISSING_EMAIL" => Some(IdentityProviderError::InvalidEmail),
        "WEAK_PASSWORD" | "INVALID_PASSWORD" => Some(IdentityProviderError::WeakPassword),
        "TOKEN_EXPIRED" => Some(IdentityProviderError::TokenExpired),
        "INVALID_ID_TOKEN" => Some(IdentityProviderError::InvalidToken {
            message: reason.to_owned(),
        }),
        "USER_NOT_FOUND" => Some(IdentityProviderError::AccountNotFound),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    //! Classification and decoding coverage; transport is not exercised.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("EMAIL_EXISTS", IdentityProviderError::EmailAlreadyInUse)]
    #[case("INVALID_EMAIL", IdentityProviderError::InvalidEmail)]
    #[case(
        "WEAK_PASSWORD : Password should be at least 6 characters",
        IdentityProviderError::WeakPassword
    )]
    #[case("TOKEN_EXPIRED", IdentityProviderError::TokenExpired)]
    #[case("USER_NOT_FOUND", IdentityProviderError::AccountNotFound)]
    fn known_reasons_are_classified(
        #[case] reason: &str,
        #[case] expected: IdentityProviderError,
    ) {
        assert_eq!(classify_reason(reason), Some(expected));
    }

    #[test]
    fn unknown_reasons_fall_back_to_upstream() {
        let body = br#"{"error":{"message":"QUOTA_EXCEEDED"}}"#;
        let error = classify_failure(StatusCode::BAD_REQUEST, body);
        assert!(matches!(error, IdentityProviderError::Upstream { .. }));
    }

    #[test]
    fn invalid_id_token_reason_keeps_the_message() {
        let body = br#"{"error":{"message":"INVALID_ID_TOKEN"}}"#;
        let error = classify_failure(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            error,
            IdentityProviderError::InvalidToken {
                message: "INVALID_ID_TOKEN".to_owned()
            }
        );
    }

    #[test]
    fn lookup_response_decodes_user_records() {
        let body = r#"{
            "users": [{
                "localId": "uid-1",
                "email": "a@test.com",
                "displayName": "A",
                "emailVerified": true
            }]
        }"#;
        let decoded: LookupResponseDto = serde_json::from_str(body).expect("decodes");
        let record = decoded
            .users
            .expect("users present")
            .into_iter()
            .next()
            .expect("one record");
        let account = record.into_provider_account();
        assert_eq!(account.uid, "uid-1");
        assert_eq!(account.email.as_ref().map(|e| e.as_ref()), Some("a@test.com"));
        assert!(account.email_verified);
    }

    #[test]
    fn empty_lookup_response_decodes_to_no_users() {
        let decoded: LookupResponseDto = serde_json::from_str("{}").expect("decodes");
        assert!(decoded.users.is_none());
    }
}
