//! One-time email verification codes.
//!
//! A code proves ownership of an email address before an account is created.
//! The store owning these records is the authority on expiry; this module
//! only defines the record shape, the code alphabet, and the TTL.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::domain::account::Email;

/// How long an issued code stays valid.
pub fn code_ttl() -> Duration {
    Duration::minutes(10)
}

/// Generate a uniformly random 6-digit numeric code.
///
/// Codes never carry a leading zero, so users can re-type them without
/// ambiguity.
pub fn generate_code(rng: &mut impl Rng) -> String {
    rng.gen_range(100_000..1_000_000u32).to_string()
}

/// A live verification code keyed by email.
///
/// ## Invariants
/// - At most one record exists per email; issuing replaces any prior one.
/// - `expires_at` is always `created_at + code_ttl()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    pub email: Email,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerificationCode {
    /// Build a record issued at `now`.
    pub fn issued_at(email: Email, code: String, now: DateTime<Utc>) -> Self {
        Self {
            email,
            code,
            created_at: now,
            expires_at: now + code_ttl(),
        }
    }

    /// Whether the code is past its deadline at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..64 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn expiry_sits_ten_minutes_after_issuance() {
        let issued = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("fixture time");
        let record = VerificationCode::issued_at(
            Email::new("a@test.com").expect("fixture email"),
            "123456".to_owned(),
            issued,
        );
        assert!(!record.is_expired(issued));
        assert!(!record.is_expired(issued + Duration::minutes(9)));
        assert!(record.is_expired(issued + Duration::minutes(10)));
    }
}
