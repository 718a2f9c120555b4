//! Shared HTTP test harness: the real app wired over deterministic doubles.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use backend::domain::ports::{
    AccountRepository, Clock, IdentityProvider, Mailer, MatchLog, VerificationCodeStore,
    VerifiedIdentity,
};
use backend::domain::{Email, ProfileService, RegistrationService, SocialGraphService};
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    InMemoryAccountRepository, InMemoryMatchLog, InMemoryVerificationCodeStore,
};
use backend::server::configure_app;
use backend::test_support::{FixedClock, RecordingMailer, StubIdentityProvider};

/// Everything a test needs to drive the app and inspect side effects.
pub struct TestHarness {
    pub state: web::Data<HttpState>,
    pub health: web::Data<HealthState>,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub matches: Arc<InMemoryMatchLog>,
    pub identity: Arc<StubIdentityProvider>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<FixedClock>,
}

/// Instant every harness clock starts at.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("fixture time")
}

/// Build the full service graph over in-memory adapters and doubles.
pub fn harness() -> TestHarness {
    let clock = Arc::new(FixedClock::at(start_time()));
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let codes = Arc::new(InMemoryVerificationCodeStore::new(
        Arc::clone(&clock) as Arc<dyn Clock>
    ));
    let matches = Arc::new(InMemoryMatchLog::new());
    let identity = Arc::new(StubIdentityProvider::new());
    let mailer = Arc::new(RecordingMailer::new());

    let registration = Arc::new(RegistrationService::new(
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
        codes as Arc<dyn VerificationCodeStore>,
        Arc::clone(&identity) as Arc<dyn IdentityProvider>,
        Arc::clone(&mailer) as Arc<dyn Mailer>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    ));
    let profiles = Arc::new(ProfileService::new(
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    ));
    let social = Arc::new(SocialGraphService::new(
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
        Arc::clone(&matches) as Arc<dyn MatchLog>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    ));

    let state = web::Data::new(HttpState::new(
        registration,
        profiles,
        social,
        Arc::clone(&identity) as Arc<dyn IdentityProvider>,
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
    ));
    let health = web::Data::new(HealthState::new());
    health.mark_ready();

    TestHarness {
        state,
        health,
        accounts,
        matches,
        identity,
        mailer,
        clock,
    }
}

/// Build the actix app exactly as `main` wires it.
pub fn test_app(
    h: &TestHarness,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().configure(configure_app(h.state.clone(), h.health.clone()))
}

/// Script a bearer token for `email` and link the local account through
/// `POST /users/profile`. Returns the account id as a string.
pub async fn link_account<S, B>(
    app: &S,
    h: &TestHarness,
    token: &str,
    email: &str,
    name: &str,
) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
    B::Error: std::fmt::Debug,
{
    h.identity.accept_token(
        token,
        VerifiedIdentity {
            uid: format!("uid-{token}"),
            email: Some(Email::new(email).expect("fixture email")),
            display_name: Some(name.to_owned()),
        },
    );
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/users/profile")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert!(
        response.status().is_success(),
        "profile sync failed: {}",
        response.status()
    );
    let body: Value = actix_test::read_body_json(response).await;
    body["id"].as_str().expect("account id").to_owned()
}

/// Build an authenticated request.
pub fn authed(
    method: actix_web::http::Method,
    uri: &str,
    token: &str,
) -> actix_test::TestRequest {
    actix_test::TestRequest::default()
        .method(method)
        .uri(uri)
        .insert_header(("Authorization", format!("Bearer {token}")))
}

/// Swipe one user on another and return the parsed response body.
pub async fn swipe<S, B>(app: &S, token: &str, user_id: &str, target_id: &str, action: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
    B::Error: std::fmt::Debug,
{
    let response = actix_test::call_service(
        app,
        authed(actix_web::http::Method::POST, "/users/swipe", token)
            .set_json(json!({
                "userId": user_id,
                "swipedUserId": target_id,
                "action": action,
            }))
            .to_request(),
    )
    .await;
    assert!(
        response.status().is_success(),
        "swipe failed: {}",
        response.status()
    );
    actix_test::read_body_json(response).await
}
