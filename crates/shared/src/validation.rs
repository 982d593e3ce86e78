//! Common validation logic shared across request DTOs.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Length of a fully formatted phone number, e.g. `(514)555-0199`.
///
/// Search filters on telephone options only apply once the value has this
/// exact length; partially typed numbers are ignored.
pub const FORMATTED_PHONE_LEN: usize = 13;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\(\d{3}\)\d{3}-\d{4}$").unwrap();
}

/// Returns true when the value is a fully formatted phone number.
pub fn is_formatted_phone(value: &str) -> bool {
    value.len() == FORMATTED_PHONE_LEN && PHONE_RE.is_match(value)
}

/// Validator-compatible phone check for DTO fields.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if is_formatted_phone(value) {
        Ok(())
    } else {
        Err(ValidationError::new("phone_format"))
    }
}

/// Returns the trimmed value when non-empty.
pub fn trimmed(value: &str) -> Option<&str> {
    let t = value.trim();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}
