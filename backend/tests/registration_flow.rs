//! End-to-end registration over the HTTP surface.

mod support;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{Method, StatusCode};
use actix_web::test as actix_test;
use chrono::Duration;
use serde_json::{Value, json};

use backend::domain::Email;
use backend::domain::ports::ProviderAccount;

use support::{harness, test_app};

async fn send_code<S, B>(app: &S, email: &str) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/auth/send-verification-code")
            .set_json(json!({ "email": email }))
            .to_request(),
    )
    .await
}

async fn register<S, B>(
    app: &S,
    email: &str,
    code: &str,
    password: &str,
    name: &str,
) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/auth/verify-code-and-register")
            .set_json(json!({
                "email": email,
                "code": code,
                "password": password,
                "name": name,
            }))
            .to_request(),
    )
    .await
}

#[actix_web::test]
async fn code_request_then_registration_creates_the_account() {
    let h = harness();
    let app = actix_test::init_service(test_app(&h)).await;

    let response = send_code(&app, "a@test.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "Verification code sent to your email.");

    let code = h.mailer.last_code_for("a@test.com").expect("code mailed");
    let response = register(&app, "a@test.com", &code, "secret1", "A").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;

    assert!(
        body["customToken"]
            .as_str()
            .is_some_and(|token| !token.is_empty())
    );
    assert_eq!(body["user"]["email"], "a@test.com");
    assert_eq!(body["user"]["travelType"], "family");
    assert_eq!(body["user"]["favorites"], json!([]));
    assert_eq!(body["user"]["name"], "A");

    // Provider account and local account both exist, linked by uid.
    assert!(h.identity.has_account("a@test.com"));
    let stored = h
        .accounts
        .find_by_email(&Email::new("a@test.com").expect("email"))
        .await
        .expect("lookup")
        .expect("account stored");
    assert_eq!(
        stored.provider_id.as_deref(),
        body["user"]["providerId"].as_str()
    );
}

#[actix_web::test]
async fn the_mailed_code_is_single_use() {
    let h = harness();
    let app = actix_test::init_service(test_app(&h)).await;

    assert_eq!(send_code(&app, "a@test.com").await.status(), StatusCode::OK);
    let code = h.mailer.last_code_for("a@test.com").expect("code mailed");

    let first = register(&app, "a@test.com", &code, "secret1", "A").await;
    assert_eq!(first.status(), StatusCode::CREATED);

    // The second attempt races a fresh registration against the spent
    // code; the code check fires before any provider lookup.
    let second = register(&app, "a@test.com", &code, "secret1", "A").await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(second).await;
    assert_eq!(body["details"]["code"], "invalid_code");
}

#[actix_web::test]
async fn code_requests_for_registered_emails_conflict() {
    let h = harness();
    let app = actix_test::init_service(test_app(&h)).await;
    h.identity.register_account(ProviderAccount {
        uid: "uid-taken".to_owned(),
        email: Some(Email::new("taken@test.com").expect("email")),
        display_name: None,
        email_verified: true,
    });

    let response = send_code(&app, "taken@test.com").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["message"], "User with this email already exists.");
}

#[actix_web::test]
async fn malformed_emails_are_rejected_with_field_details() {
    let h = harness();
    let app = actix_test::init_service(test_app(&h)).await;

    let response = send_code(&app, "not-an-address").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "email");
}

#[actix_web::test]
async fn a_wrong_code_is_rejected() {
    let h = harness();
    let app = actix_test::init_service(test_app(&h)).await;
    assert_eq!(send_code(&app, "a@test.com").await.status(), StatusCode::OK);

    let mailed = h.mailer.last_code_for("a@test.com").expect("code mailed");
    let wrong = if mailed == "123456" { "654321" } else { "123456" };
    let response = register(&app, "a@test.com", wrong, "secret1", "A").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "invalid_code");
}

#[actix_web::test]
async fn an_expired_code_is_rejected_with_a_distinct_reason() {
    let h = harness();
    let app = actix_test::init_service(test_app(&h)).await;
    assert_eq!(send_code(&app, "a@test.com").await.status(), StatusCode::OK);
    let code = h.mailer.last_code_for("a@test.com").expect("code mailed");

    h.clock.advance(Duration::minutes(10) + Duration::seconds(1));
    let response = register(&app, "a@test.com", &code, "secret1", "A").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "code_expired");
}

#[actix_web::test]
async fn reissuing_invalidates_the_previous_code() {
    let h = harness();
    let app = actix_test::init_service(test_app(&h)).await;

    assert_eq!(send_code(&app, "a@test.com").await.status(), StatusCode::OK);
    let first = h.mailer.last_code_for("a@test.com").expect("first code");
    assert_eq!(send_code(&app, "a@test.com").await.status(), StatusCode::OK);
    let second = h.mailer.last_code_for("a@test.com").expect("second code");

    if first != second {
        let stale = register(&app, "a@test.com", &first, "secret1", "A").await;
        assert_eq!(stale.status(), StatusCode::BAD_REQUEST);
    }
    let fresh = register(&app, "a@test.com", &second, "secret1", "A").await;
    assert_eq!(fresh.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn legacy_register_and_login_round_trip() {
    let h = harness();
    let app = actix_test::init_service(test_app(&h)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/users/register")
            .set_json(json!({
                "email": "legacy@test.com",
                "password": "hunter22",
                "name": "Legacy",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let login = |password: &'static str| {
        actix_test::TestRequest::post()
            .uri("/users/login")
            .set_json(json!({ "email": "legacy@test.com", "password": password }))
            .to_request()
    };
    let ok = actix_test::call_service(&app, login("hunter22")).await;
    assert_eq!(ok.status(), StatusCode::OK);

    let bad = actix_test::call_service(&app, login("wrong-password")).await;
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn health_probes_respond() {
    let h = harness();
    let app = actix_test::init_service(test_app(&h)).await;

    let ready = actix_test::call_service(
        &app,
        actix_test::TestRequest::with_uri("/health/ready")
            .method(Method::GET)
            .to_request(),
    )
    .await;
    assert_eq!(ready.status(), StatusCode::OK);

    let live = actix_test::call_service(
        &app,
        actix_test::TestRequest::with_uri("/health/live")
            .method(Method::GET)
            .to_request(),
    )
    .await;
    assert_eq!(live.status(), StatusCode::OK);
}
