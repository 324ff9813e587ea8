use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use super::{ValidationResult, ValidatorKind};
use crate::value::FieldValue;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex compiles"));

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MobileOptions {
    pub min_digits: usize,
    pub max_digits: usize,
    /// Replaces the digit-count check; matched against the raw value.
    pub pattern: Option<String>,
}

impl Default for MobileOptions {
    fn default() -> Self {
        Self {
            min_digits: 10,
            max_digits: 15,
            pattern: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PasswordOptions {
    pub min_length: usize,
    pub require_upper: bool,
    pub require_lower: bool,
    pub require_number: bool,
    pub require_special: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_upper: true,
            require_lower: true,
            require_number: true,
            require_special: false,
        }
    }
}

pub(super) fn run(
    kind: ValidatorKind,
    key: &str,
    value: &FieldValue,
    options: Option<&Value>,
) -> ValidationResult {
    match kind {
        ValidatorKind::Email => email(key, value),
        ValidatorKind::Mobile => match parse_options(options) {
            Ok(options) => mobile(key, value, &options),
            Err(message) => ValidationResult::failure(key, message),
        },
        ValidatorKind::Password => match parse_options(options) {
            Ok(options) => password(key, value, &options),
            Err(message) => ValidationResult::failure(key, message),
        },
        ValidatorKind::Required => required(key, value),
        ValidatorKind::Url => url(key, value),
    }
}

fn parse_options<T>(options: Option<&Value>) -> Result<T, String>
where
    T: DeserializeOwned + Default,
{
    match options {
        None | Some(Value::Null) => Ok(T::default()),
        Some(raw) => {
            serde_json::from_value(raw.clone()).map_err(|err| format!("invalid options: {err}"))
        }
    }
}

fn email(key: &str, value: &FieldValue) -> ValidationResult {
    let text = value.as_text();
    ValidationResult::check(key, EMAIL.is_match(text.trim()), "Invalid email")
}

fn mobile(key: &str, value: &FieldValue, options: &MobileOptions) -> ValidationResult {
    let raw = value.as_text();
    let success = match &options.pattern {
        Some(pattern) => match Regex::new(pattern) {
            Ok(regex) => regex.is_match(&raw),
            Err(err) => {
                return ValidationResult::failure(key, format!("invalid mobile pattern: {err}"));
            }
        },
        None => {
            let digits = raw.chars().filter(char::is_ascii_digit).count();
            (options.min_digits..=options.max_digits).contains(&digits)
        }
    };
    ValidationResult::check(key, success, "Invalid mobile number")
}

fn password(key: &str, value: &FieldValue, options: &PasswordOptions) -> ValidationResult {
    let text = value.as_text();
    let min_message = format!("Minimum {} characters required", options.min_length);
    let checks: [(bool, &str); 5] = [
        (text.chars().count() >= options.min_length, min_message.as_str()),
        (
            !options.require_upper || text.chars().any(|ch| ch.is_ascii_uppercase()),
            "At least one uppercase letter required",
        ),
        (
            !options.require_lower || text.chars().any(|ch| ch.is_ascii_lowercase()),
            "At least one lowercase letter required",
        ),
        (
            !options.require_number || text.chars().any(|ch| ch.is_ascii_digit()),
            "At least one number required",
        ),
        (
            !options.require_special || text.chars().any(|ch| !ch.is_ascii_alphanumeric()),
            "At least one special character required",
        ),
    ];
    match checks.iter().find(|(ok, _)| !ok) {
        Some((_, message)) => ValidationResult::failure(key, *message),
        None => ValidationResult::pass(key),
    }
}

fn required(key: &str, value: &FieldValue) -> ValidationResult {
    ValidationResult::check(key, !value.is_blank(), "This field is required")
}

fn url(key: &str, value: &FieldValue) -> ValidationResult {
    let text = value.as_text();
    let trimmed = text.trim();
    let success = !trimmed.is_empty() && {
        let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };
        Url::parse(&candidate).is_ok()
    };
    ValidationResult::check(key, success, "Invalid URL")
}
