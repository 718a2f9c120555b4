//! Payload parsing helpers shared by the HTTP handlers.
//!
//! Each helper turns a raw string into a validated domain value or a 400
//! with a field-level detail payload, so handlers never build errors by
//! hand.

use serde_json::json;

use crate::domain::account::{AccountId, DisplayName, Email, TravelType};
use crate::domain::auth::Password;
use crate::domain::{AccountValidationError, Error};

fn field_error(message: String, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

/// Parse and normalise an email address.
pub fn parse_email(raw: &str) -> Result<Email, Error> {
    Email::new(raw).map_err(|error| {
        let code = match error {
            AccountValidationError::EmptyEmail => "missing_email",
            _ => "invalid_email",
        };
        field_error(error.to_string(), "email", code)
    })
}

/// Parse a display name.
pub fn parse_display_name(raw: &str) -> Result<DisplayName, Error> {
    DisplayName::new(raw).map_err(|error| field_error(error.to_string(), "name", "invalid_name"))
}

/// Parse a password, rejecting empty input.
pub fn parse_password(raw: &str) -> Result<Password, Error> {
    Password::new(raw).map_err(|error| field_error(error.to_string(), "password", "missing_password"))
}

/// Parse an account id from a path or body field.
pub fn parse_account_id(raw: &str, field: &str) -> Result<AccountId, Error> {
    AccountId::parse(raw).map_err(|error| field_error(error.to_string(), field, "invalid_id"))
}

/// Parse a travel-type preference.
pub fn parse_travel_type(raw: &str) -> Result<TravelType, Error> {
    raw.parse::<TravelType>()
        .map_err(|error| field_error(error.to_string(), "travelType", "invalid_travel_type"))
}

/// Reject an empty or whitespace-only required field.
pub fn require_non_empty<'a>(raw: &'a str, field: &str) -> Result<&'a str, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(field_error(
            format!("{field} is required."),
            field,
            "missing_field",
        ));
    }
    Ok(trimmed)
}
