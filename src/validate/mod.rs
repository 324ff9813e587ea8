//! Keyed validation rules.
//!
//! Built-in rules dispatch on [`ValidatorKind`]; anything registered through
//! [`ValidatorRegistry::add_rule`] is looked up by its string key. A key that
//! resolves to nothing is reported as a failed validation, not an error.

mod rules;

use std::{collections::HashMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::value::FieldValue;

pub use rules::{MobileOptions, PasswordOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    Email,
    Mobile,
    Password,
    Required,
    Url,
}

impl ValidatorKind {
    pub const ALL: [ValidatorKind; 5] = [
        ValidatorKind::Email,
        ValidatorKind::Mobile,
        ValidatorKind::Password,
        ValidatorKind::Required,
        ValidatorKind::Url,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ValidatorKind::Email => "validate_email",
            ValidatorKind::Mobile => "validate_mobile",
            ValidatorKind::Password => "validate_password",
            ValidatorKind::Required => "validate_required",
            ValidatorKind::Url => "validate_url",
        }
    }

    /// Also accepts `validate_phone` for [`ValidatorKind::Mobile`].
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "validate_phone" => Some(ValidatorKind::Mobile),
            other => Self::ALL.into_iter().find(|kind| kind.key() == other),
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub key: String,
    pub success: bool,
    pub fail: bool,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn pass(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            success: true,
            fail: false,
            message: None,
        }
    }

    pub fn failure(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            success: false,
            fail: true,
            message: Some(message.into()),
        }
    }

    pub fn check(key: impl Into<String>, success: bool, message: impl Into<String>) -> Self {
        if success {
            Self::pass(key)
        } else {
            Self::failure(key, message)
        }
    }
}

/// A validator key with optional rule options, as written in form documents:
/// either `"validate_email"` or `{"key": "validate_password", "options": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidatorRef {
    Key(String),
    WithOptions {
        key: String,
        #[serde(default)]
        options: Option<Value>,
    },
}

impl ValidatorRef {
    pub fn new(key: impl Into<String>) -> Self {
        ValidatorRef::Key(key.into())
    }

    pub fn with_options(key: impl Into<String>, options: Value) -> Self {
        ValidatorRef::WithOptions {
            key: key.into(),
            options: Some(options),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ValidatorRef::Key(key) | ValidatorRef::WithOptions { key, .. } => key,
        }
    }

    pub fn options(&self) -> Option<&Value> {
        match self {
            ValidatorRef::Key(_) => None,
            ValidatorRef::WithOptions { options, .. } => options.as_ref(),
        }
    }
}

impl From<ValidatorKind> for ValidatorRef {
    fn from(kind: ValidatorKind) -> Self {
        ValidatorRef::Key(kind.key().to_string())
    }
}

impl From<&str> for ValidatorRef {
    fn from(key: &str) -> Self {
        ValidatorRef::Key(key.to_string())
    }
}

pub type Rule = Arc<dyn Fn(&FieldValue, Option<&Value>) -> ValidationResult + Send + Sync>;

#[derive(Clone)]
enum RuleEntry {
    Builtin(ValidatorKind),
    Custom(Rule),
}

#[derive(Clone)]
pub struct ValidatorRegistry {
    rules: HashMap<String, RuleEntry>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        let mut rules = HashMap::new();
        for kind in ValidatorKind::ALL {
            rules.insert(kind.key().to_string(), RuleEntry::Builtin(kind));
        }
        rules.insert(
            "validate_phone".to_string(),
            RuleEntry::Builtin(ValidatorKind::Mobile),
        );
        Self { rules }
    }
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with no rules at all, built-ins included.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn validate(&self, key: &str, value: &FieldValue, options: Option<&Value>) -> ValidationResult {
        match self.rules.get(key) {
            Some(RuleEntry::Builtin(kind)) => rules::run(*kind, key, value, options),
            Some(RuleEntry::Custom(rule)) => rule(value, options),
            None => {
                warn!(key, "validation requested for unregistered key");
                ValidationResult::failure(key, format!("unknown validator: {key}"))
            }
        }
    }

    pub fn validate_ref(&self, validator: &ValidatorRef, value: &FieldValue) -> ValidationResult {
        self.validate(validator.key(), value, validator.options())
    }

    /// Register `rule` under `key`, replacing whatever was there.
    pub fn add_rule<F>(&mut self, key: impl Into<String>, rule: F)
    where
        F: Fn(&FieldValue, Option<&Value>) -> ValidationResult + Send + Sync + 'static,
    {
        let key = key.into();
        let previous = self.rules.insert(key.clone(), RuleEntry::Custom(Arc::new(rule)));
        match previous {
            Some(RuleEntry::Builtin(kind)) => {
                debug!(key = %key, builtin = %kind, "built-in rule replaced");
            }
            Some(RuleEntry::Custom(_)) => debug!(key = %key, "custom rule replaced"),
            None => debug!(key = %key, "rule registered"),
        }
    }

    /// Returns `true` when a rule was removed.
    pub fn remove_rule(&mut self, key: &str) -> bool {
        let removed = self.rules.remove(key).is_some();
        if removed {
            debug!(key, "rule removed");
        }
        removed
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("ValidatorRegistry").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_rule_through_registry() {
        let registry = ValidatorRegistry::new();
        let ok = registry.validate("validate_email", &FieldValue::text("a@b.com"), None);
        assert!(ok.success);
        assert_eq!(ok.key, "validate_email");
        let bad = registry.validate("validate_email", &FieldValue::text("not-an-email"), None);
        assert!(bad.fail);
        assert_eq!(bad.message.as_deref(), Some("Invalid email"));
    }

    #[test]
    fn unknown_key_fails_softly() {
        let registry = ValidatorRegistry::new();
        let result = registry.validate("nonexistent_key", &FieldValue::text("x"), None);
        assert!(result.fail);
        assert_eq!(
            result.message.as_deref(),
            Some("unknown validator: nonexistent_key")
        );
    }

    #[test]
    fn phone_alias_uses_mobile_rule() {
        let registry = ValidatorRegistry::new();
        let result = registry.validate("validate_phone", &FieldValue::text("123"), None);
        assert_eq!(result.key, "validate_phone");
        assert_eq!(result.message.as_deref(), Some("Invalid mobile number"));
    }

    #[test]
    fn explicit_registration_replaces_builtin_and_removal_forgets_it() {
        let mut registry = ValidatorRegistry::new();
        registry.add_rule("validate_email", |value, _| {
            ValidationResult::check(
                "validate_email",
                value.as_text().ends_with("@corp.io"),
                "corporate address required",
            )
        });
        let result = registry.validate("validate_email", &FieldValue::text("a@b.com"), None);
        assert_eq!(result.message.as_deref(), Some("corporate address required"));

        assert!(registry.remove_rule("validate_email"));
        assert!(!registry.remove_rule("validate_email"));
        let result = registry.validate("validate_email", &FieldValue::text("a@corp.io"), None);
        assert!(result.fail);
    }

    #[test]
    fn custom_rules_receive_options() {
        let mut registry = ValidatorRegistry::new();
        registry.add_rule("max_len", |value, options| {
            let limit = options
                .and_then(|opts| opts.get("max"))
                .and_then(Value::as_u64)
                .unwrap_or(3) as usize;
            ValidationResult::check("max_len", value.as_text().len() <= limit, "too long")
        });
        let rule = ValidatorRef::with_options("max_len", json!({"max": 5}));
        assert!(registry.validate_ref(&rule, &FieldValue::text("hello")).success);
        assert!(registry.validate_ref(&"max_len".into(), &FieldValue::text("hello")).fail);
    }

    #[test]
    fn validator_refs_deserialize_from_both_shapes() {
        let refs: Vec<ValidatorRef> = serde_json::from_value(json!([
            "validate_required",
            {"key": "validate_password", "options": {"minLength": 12}}
        ]))
        .unwrap();
        assert_eq!(refs[0].key(), "validate_required");
        assert!(refs[0].options().is_none());
        assert_eq!(refs[1].key(), "validate_password");
        assert_eq!(refs[1].options(), Some(&json!({"minLength": 12})));
    }
}
