//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Russian phone numbers: `+7` or `8`, then ten digits with optional separators.
    static ref PHONE_REGEX: Regex =
        Regex::new(r"^(\+7|8)[\s\-]?\(?\d{3}\)?[\s\-]?\d{3}[\s\-]?\d{2}[\s\-]?\d{2}$")
            .expect("phone pattern is valid");
}

/// Validates that a phone number looks like `+79991234567` or `8 (999) 123-45-67`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone.trim()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message =
            Some("Enter a valid phone number, e.g. +79991234567 or 89991234567".into());
        Err(err)
    }
}

/// Normalizes an accepted phone number to `+7XXXXXXXXXX`.
///
/// Returns `None` when the number does not pass [`validate_phone`].
pub fn normalize_phone(phone: &str) -> Option<String> {
    validate_phone(phone).ok()?;

    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let normalized = if let Some(rest) = digits.strip_prefix('8') {
        format!("7{}", rest)
    } else if digits.starts_with('7') {
        digits
    } else {
        format!("7{}", digits)
    };

    Some(format!("+{}", normalized))
}

/// Validates that a text field contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required".into());
        Err(err)
    } else {
        Ok(())
    }
}
