//! Behaviour coverage for identity sync, profile updates, and the legacy
//! direct path.

use chrono::{TimeZone, Utc};

use super::*;
use crate::domain::error::ErrorCode;
use crate::outbound::persistence::InMemoryAccountRepository;
use crate::test_support::FixedClock;

struct Harness {
    service: ProfileService,
    accounts: Arc<InMemoryAccountRepository>,
}

fn harness() -> Harness {
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("fixture time");
    let clock = Arc::new(FixedClock::at(start));
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let service = ProfileService::new(
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
        clock as Arc<dyn Clock>,
    );
    Harness { service, accounts }
}

fn email(raw: &str) -> Email {
    Email::new(raw).expect("fixture email")
}

fn identity(uid: &str, raw_email: &str, name: Option<&str>) -> VerifiedIdentity {
    VerifiedIdentity {
        uid: uid.to_owned(),
        email: Some(email(raw_email)),
        display_name: name.map(ToOwned::to_owned),
    }
}

#[tokio::test]
async fn sync_creates_an_account_for_an_unknown_identity() {
    let h = harness();
    let account = h
        .service
        .sync_identity(identity("uid-1", "new@test.com", Some("Nomad")))
        .await
        .expect("sync creates");
    assert_eq!(account.provider_id.as_deref(), Some("uid-1"));
    assert_eq!(account.email.as_ref(), "new@test.com");
    assert_eq!(account.display_name.as_ref(), "Nomad");
}

#[tokio::test]
async fn sync_falls_back_to_an_anonymous_name() {
    let h = harness();
    let account = h
        .service
        .sync_identity(identity("uid-1", "new@test.com", None))
        .await
        .expect("sync creates");
    assert_eq!(account.display_name.as_ref(), "Anonymous User");
}

#[tokio::test]
async fn sync_links_the_uid_onto_an_existing_email_match() {
    let h = harness();
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("fixture time");
    let existing = Account::new(
        email("old@test.com"),
        DisplayName::new("Existing").expect("fixture name"),
        now,
    );
    h.accounts.create(&existing).await.expect("seed");

    let account = h
        .service
        .sync_identity(identity("uid-7", "old@test.com", Some("Existing")))
        .await
        .expect("sync links");
    assert_eq!(account.id, existing.id);
    assert_eq!(account.provider_id.as_deref(), Some("uid-7"));
}

#[tokio::test]
async fn sync_resolves_by_provider_id_and_refreshes_drift() {
    let h = harness();
    let first = h
        .service
        .sync_identity(identity("uid-1", "new@test.com", Some("Before")))
        .await
        .expect("first sync");

    let second = h
        .service
        .sync_identity(identity("uid-1", "new@test.com", Some("After")))
        .await
        .expect("second sync");
    assert_eq!(second.id, first.id);
    assert_eq!(second.display_name.as_ref(), "After");
}

#[tokio::test]
async fn sync_requires_an_email_claim_for_new_accounts() {
    let h = harness();
    let err = h
        .service
        .sync_identity(VerifiedIdentity {
            uid: "uid-1".to_owned(),
            email: None,
            display_name: None,
        })
        .await
        .expect_err("missing email must fail");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn update_profile_applies_partial_changes() {
    let h = harness();
    let account = h
        .service
        .sync_identity(identity("uid-1", "new@test.com", Some("Nomad")))
        .await
        .expect("sync");

    let updated = h
        .service
        .update_profile(
            account.id,
            ProfileUpdate {
                bio: Some("Chasing night trains".to_owned()),
                travel_type: Some(TravelType::GenZ),
                profile_picture: Some("https://img.test/p.jpg".to_owned()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.bio, "Chasing night trains");
    assert_eq!(updated.travel_type, TravelType::GenZ);
    assert_eq!(updated.profile_picture, "https://img.test/p.jpg");
    // Untouched fields survive.
    assert_eq!(updated.display_name.as_ref(), "Nomad");

    let cleared = h
        .service
        .update_profile(
            account.id,
            ProfileUpdate {
                profile_picture: Some(String::new()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .expect("clear picture");
    assert!(cleared.profile_picture.is_empty());
}

#[tokio::test]
async fn direct_registration_stores_a_hash_not_the_password() {
    let h = harness();
    let account = h
        .service
        .register_direct(
            email("legacy@test.com"),
            Password::new("hunter22").expect("fixture password"),
            DisplayName::new("Legacy").expect("fixture name"),
        )
        .await
        .expect("register");

    let hash = account.password_hash.expect("hash stored");
    assert!(hash.starts_with("$argon2"));
    assert!(!hash.contains("hunter22"));
}

#[tokio::test]
async fn direct_registration_rejects_duplicate_emails() {
    let h = harness();
    let register = |name: &'static str| {
        h.service.register_direct(
            email("legacy@test.com"),
            Password::new("hunter22").expect("fixture password"),
            DisplayName::new(name).expect("fixture name"),
        )
    };
    register("First").await.expect("first register");
    let err = register("Second").await.expect_err("duplicate must fail");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn direct_login_verifies_the_password() {
    let h = harness();
    h.service
        .register_direct(
            email("legacy@test.com"),
            Password::new("hunter22").expect("fixture password"),
            DisplayName::new("Legacy").expect("fixture name"),
        )
        .await
        .expect("register");

    let ok = h
        .service
        .login_direct(&LoginCredentials::new(
            email("legacy@test.com"),
            Password::new("hunter22").expect("fixture password"),
        ))
        .await;
    assert!(ok.is_ok());

    let err = h
        .service
        .login_direct(&LoginCredentials::new(
            email("legacy@test.com"),
            Password::new("wrong").expect("fixture password"),
        ))
        .await
        .expect_err("wrong password must fail");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn direct_login_rejects_provider_linked_accounts() {
    let h = harness();
    h.service
        .sync_identity(identity("uid-1", "linked@test.com", Some("Linked")))
        .await
        .expect("sync");

    let err = h
        .service
        .login_direct(&LoginCredentials::new(
            email("linked@test.com"),
            Password::new("anything").expect("fixture password"),
        ))
        .await
        .expect_err("no local password must fail");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
