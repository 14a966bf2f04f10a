//! Field validation and normalization for contact submissions.
//!
//! Pure functions: raw JSON in, either a normalized [`ContactSubmission`]
//! or a field-keyed error map out.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::model::ContactSubmission;
use crate::error::FieldErrors;

pub const NAME_MAX_CHARS: usize = 100;
pub const MESSAGE_MAX_CHARS: usize = 1000;
pub const PHONE_DIGITS: usize = 10;

const EXPECTED_STRING: &str = "Expected string";

/// Web-form email syntax. Leading dots and `..` runs are rejected separately
/// since the regex crate has no lookahead.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
        .expect("email regex is valid")
});

/// Validate and normalize a raw submission.
///
/// Non-object input reports every required field as missing. Unknown keys
/// are ignored. `recaptchaToken` is not checked here.
pub fn validate(raw: &Value) -> Result<ContactSubmission, FieldErrors> {
    let empty = serde_json::Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let mut errors = FieldErrors::new();

    let name = check(&mut errors, "name", obj.get("name"), |value| {
        required_text(
            value,
            "Name is required",
            NAME_MAX_CHARS,
            "Name must be 100 characters or fewer",
        )
    });

    let email = check(&mut errors, "email", obj.get("email"), |value| {
        let trimmed = trim(value);
        if trimmed.is_empty() {
            Ok(None)
        } else if is_valid_email(trimmed) {
            Ok(Some(trimmed.to_string()))
        } else {
            Err("Please enter a valid email address")
        }
    });

    let phone = check(&mut errors, "phone", obj.get("phone"), |value| {
        let trimmed = trim(value);
        if trimmed.is_empty() {
            return Err("Phone number is required");
        }
        normalize_phone(trimmed).ok_or("Please enter a valid 10-digit US phone number")
    });

    let message = check(&mut errors, "message", obj.get("message"), |value| {
        required_text(
            value,
            "Message is required",
            MESSAGE_MAX_CHARS,
            "Message must be 1000 characters or fewer",
        )
    });

    match (name, email, phone, message) {
        (Some(name), Some(email), Some(phone), Some(message)) => Ok(ContactSubmission {
            name,
            email,
            phone,
            message,
        }),
        _ => Err(errors),
    }
}

/// Run `rule` on a string field, recording its message on failure.
///
/// A missing field is passed to the rule as `""` so each field decides
/// whether blank is allowed. An explicit `null` is not a string.
fn check<T, F>(errors: &mut FieldErrors, field: &str, value: Option<&Value>, rule: F) -> Option<T>
where
    F: FnOnce(&str) -> Result<T, &'static str>,
{
    let outcome = match value {
        None => rule(""),
        Some(Value::String(s)) => rule(s),
        Some(_) => Err(EXPECTED_STRING),
    };
    match outcome {
        Ok(v) => Some(v),
        Err(message) => {
            errors
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
            None
        }
    }
}

/// Whitespace trim that also drops the byte-order mark.
fn trim(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

fn required_text(
    value: &str,
    missing: &'static str,
    max_chars: usize,
    too_long: &'static str,
) -> Result<String, &'static str> {
    let trimmed = trim(value);
    if trimmed.is_empty() {
        Err(missing)
    } else if trimmed.chars().count() > max_chars {
        Err(too_long)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Strip non-digits and format as `(XXX) XXX-XXXX`, or `None` unless exactly
/// ten digits remain.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != PHONE_DIGITS {
        return None;
    }
    Some(format!(
        "({}) {}-{}",
        &digits[..3],
        &digits[3..6],
        &digits[6..]
    ))
}

pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_RE.is_match(email)
}
