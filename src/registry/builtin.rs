//! Builtin validators
//!
//! The pure validators are deterministic functions of the value and param;
//! the uniqueness and country validators go through the lookup collaborator
//! on the [`ValidationContext`]. A lookup failure becomes a field-level
//! failure carrying the lookup error text, nothing more.
//!
//! Most string validators skip empty input; emptiness is the business of
//! `required` and `omitempty`. `oneof` and `email` reject empty strings
//! like any other non-member value.
//!
//! [`ValidationContext`]: crate::registry::ValidationContext

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use super::context::ValidationContext;
use super::registry::{CheckResult, FieldValue, ValidatorRegistry};

/// Fails on absent or empty values
pub const REQUIRED: &str = "required";
/// Short-circuits the chain to success when the value is absent or empty
pub const OMITEMPTY: &str = "omitempty";
/// Recursion marker: validate children of an object/array field
pub const DIVE: &str = "dive";
pub const MAX: &str = "max";
pub const MIN: &str = "min";
pub const ONEOF: &str = "oneof";
pub const EMAIL: &str = "email";
pub const PHONE_NUMBER: &str = "phonenumber";
pub const USERNAME_CHARS: &str = "usernameChars";
pub const SPECIAL_CHARACTER_REQUIRED: &str = "specialCharacterRequired";
pub const NUMBER_REQUIRED: &str = "numberRequired";
pub const UPPERCASE_LETTER_REQUIRED: &str = "uppercaseLetterRequired";
pub const LOWERCASE_LETTER_REQUIRED: &str = "lowercaseLetterRequired";
pub const GDPR: &str = "gdpr";
pub const DAY_BEFORE_NOW: &str = "dayBeforeNow";
pub const UNIQUE_EMAIL: &str = "uniqueEmail";
pub const UNIQUE_USERNAME: &str = "uniqueUsername";
pub const UNIQUE_PHONE_NUMBER: &str = "uniquePhoneNumber";
pub const EXIST_COUNTRY: &str = "existCountry";

// +XXX XXX XXX XXX
fn phone_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+[0-9]{7,15}$").unwrap())
}

// One of !"#$%&'\()*+,-./:;<=>?@[\]^_{|}~
// Reference: https://owasp.org/www-community/password-special-characters
fn special_character_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r##"[!"#$%&'\\()*+,\-./:;<=>?@\[\]^_{|}~]"##).unwrap())
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]").unwrap())
}

fn uppercase_letter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Z]").unwrap())
}

fn lowercase_letter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z]").unwrap())
}

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_.'\-\s]+$").unwrap())
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

/// Installs the full builtin set into a registry
pub(super) fn install(registry: &mut ValidatorRegistry) {
    registry.install(REQUIRED, Box::new(required));
    // omitempty and dive carry no pass/fail of their own; the engine gives
    // them their short-circuit and recursion semantics.
    registry.install(OMITEMPTY, Box::new(always_pass));
    registry.install(DIVE, Box::new(always_pass));
    registry.install(MAX, Box::new(max));
    registry.install(MIN, Box::new(min));
    registry.install(ONEOF, Box::new(oneof));
    registry.install(EMAIL, Box::new(email));
    registry.install(PHONE_NUMBER, Box::new(phone_number));
    registry.install(USERNAME_CHARS, Box::new(username_chars));
    registry.install(
        SPECIAL_CHARACTER_REQUIRED,
        character_class(special_character_pattern, "must contain at least one special character"),
    );
    registry.install(
        NUMBER_REQUIRED,
        character_class(number_pattern, "must contain at least one number"),
    );
    registry.install(
        UPPERCASE_LETTER_REQUIRED,
        character_class(uppercase_letter_pattern, "must contain at least one uppercase letter"),
    );
    registry.install(
        LOWERCASE_LETTER_REQUIRED,
        character_class(lowercase_letter_pattern, "must contain at least one lowercase letter"),
    );
    registry.install(GDPR, Box::new(gdpr));
    registry.install(DAY_BEFORE_NOW, Box::new(day_before_now));
    registry.install(UNIQUE_EMAIL, unique("users", "email", UniqueMessage::Value));
    registry.install(UNIQUE_USERNAME, unique("users", "username", UniqueMessage::Value));
    registry.install(
        UNIQUE_PHONE_NUMBER,
        unique(
            "users",
            "phone_number",
            UniqueMessage::Fixed("Phone number already exists on the platform"),
        ),
    );
    registry.install(EXIST_COUNTRY, Box::new(exist_country));
}

fn always_pass(_: &FieldValue<'_>, _: &str, _: &ValidationContext) -> CheckResult {
    CheckResult::Pass
}

fn required(value: &FieldValue<'_>, _: &str, _: &ValidationContext) -> CheckResult {
    if value.is_empty() {
        CheckResult::fail("is required")
    } else {
        CheckResult::Pass
    }
}

fn parse_limit(param: &str) -> Result<i64, CheckResult> {
    param
        .parse::<i64>()
        .map_err(|_| CheckResult::fail(format!("invalid validator parameter `{}`", param)))
}

fn max(value: &FieldValue<'_>, param: &str, _: &ValidationContext) -> CheckResult {
    let limit = match parse_limit(param) {
        Ok(limit) => limit,
        Err(fail) => return fail,
    };

    match value.raw() {
        Some(Value::String(s)) if s.chars().count() as i64 > limit => {
            CheckResult::fail(format!("must be at most {} characters long", limit))
        }
        Some(Value::Array(a)) if a.len() as i64 > limit => {
            CheckResult::fail(format!("must contain at most {} items", limit))
        }
        Some(Value::Number(n)) if n.as_f64().unwrap_or(0.0) > limit as f64 => {
            CheckResult::fail(format!("must be at most {}", limit))
        }
        _ => CheckResult::Pass,
    }
}

fn min(value: &FieldValue<'_>, param: &str, _: &ValidationContext) -> CheckResult {
    let limit = match parse_limit(param) {
        Ok(limit) => limit,
        Err(fail) => return fail,
    };

    match value.raw() {
        Some(Value::String(s)) if (s.chars().count() as i64) < limit => {
            CheckResult::fail(format!("must be at least {} characters long", limit))
        }
        Some(Value::Array(a)) if (a.len() as i64) < limit => {
            CheckResult::fail(format!("must contain at least {} items", limit))
        }
        Some(Value::Number(n)) if n.as_f64().unwrap_or(0.0) < limit as f64 => {
            CheckResult::fail(format!("must be at least {}", limit))
        }
        _ => CheckResult::Pass,
    }
}

fn oneof(value: &FieldValue<'_>, param: &str, _: &ValidationContext) -> CheckResult {
    let candidate = match value.raw() {
        None => return CheckResult::Pass,
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return CheckResult::fail(format!("must be one of: {}", param)),
    };

    if param.split_whitespace().any(|token| token == candidate) {
        CheckResult::Pass
    } else {
        CheckResult::fail(format!("must be one of: {}", param))
    }
}

fn email(value: &FieldValue<'_>, _: &str, _: &ValidationContext) -> CheckResult {
    match value.as_str() {
        None => CheckResult::Pass,
        Some(s) if email_pattern().is_match(s) => CheckResult::Pass,
        Some(_) => CheckResult::fail("must be a valid email address"),
    }
}

fn phone_number(value: &FieldValue<'_>, _: &str, _: &ValidationContext) -> CheckResult {
    match value.as_str() {
        Some(s) if !s.is_empty() && !phone_number_pattern().is_match(s) => {
            CheckResult::fail("Invalid format")
        }
        _ => CheckResult::Pass,
    }
}

fn username_chars(value: &FieldValue<'_>, _: &str, _: &ValidationContext) -> CheckResult {
    match value.as_str() {
        Some(s) if !s.is_empty() && !username_pattern().is_match(s) => {
            CheckResult::fail("contains invalid characters")
        }
        _ => CheckResult::Pass,
    }
}

/// Builds a "string must contain a character of this class" validator
fn character_class(
    pattern: fn() -> &'static Regex,
    message: &'static str,
) -> Box<dyn Fn(&FieldValue<'_>, &str, &ValidationContext) -> CheckResult + Send + Sync> {
    Box::new(move |value, _, _| match value.as_str() {
        Some(s) if !s.is_empty() && !pattern().is_match(s) => CheckResult::fail(message),
        _ => CheckResult::Pass,
    })
}

fn gdpr(value: &FieldValue<'_>, _: &str, _: &ValidationContext) -> CheckResult {
    if value.as_bool() == Some(true) {
        CheckResult::Pass
    } else {
        CheckResult::fail("must be accepted")
    }
}

// Entered date must be before current time.
fn day_before_now(value: &FieldValue<'_>, _: &str, ctx: &ValidationContext) -> CheckResult {
    let raw = match value.as_str() {
        Some(s) => s,
        None => return CheckResult::Pass,
    };

    let date = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => return CheckResult::fail("must be a valid date (YYYY-MM-DD)"),
    };

    let midnight = match date.and_hms_opt(0, 0, 0) {
        Some(dt) => dt.and_utc(),
        None => return CheckResult::fail("must be a valid date (YYYY-MM-DD)"),
    };

    if midnight < ctx.now() {
        CheckResult::Pass
    } else {
        CheckResult::fail("must be a date in the past")
    }
}

#[derive(Clone, Copy)]
enum UniqueMessage {
    /// "`{value}` already exists"
    Value,
    /// A fixed text regardless of value
    Fixed(&'static str),
}

/// Builds a uniqueness validator against `entity.field`.
///
/// A non-empty param (e.g. `"Uid"`) switches on the unique-excluding-self
/// pattern: the record identified by the validation context is allowed to
/// keep its own value.
fn unique(
    entity: &'static str,
    field: &'static str,
    message: UniqueMessage,
) -> Box<dyn Fn(&FieldValue<'_>, &str, &ValidationContext) -> CheckResult + Send + Sync> {
    Box::new(move |value, param, ctx| {
        let candidate = match value.as_str() {
            Some(s) if !s.is_empty() => s,
            _ => return CheckResult::Pass,
        };

        let exclude = if param.is_empty() { None } else { ctx.record_uid() };

        match ctx.lookup_exists(entity, field, candidate, exclude) {
            Ok(false) => CheckResult::Pass,
            Ok(true) => match message {
                UniqueMessage::Value => CheckResult::fail(format!("`{}` already exists", candidate)),
                UniqueMessage::Fixed(text) => CheckResult::fail(text),
            },
            Err(err) => CheckResult::fail(err.to_string()),
        }
    })
}

fn exist_country(value: &FieldValue<'_>, _: &str, ctx: &ValidationContext) -> CheckResult {
    let code = match value.as_str() {
        Some(s) => s,
        None => return CheckResult::Pass,
    };

    match ctx.country_exists(code) {
        Ok(true) => CheckResult::Pass,
        Ok(false) => CheckResult::fail("unknown country code"),
        Err(err) => CheckResult::fail(err.to_string()),
    }
}
