use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::value::FieldValue;

/// Field values keyed by name, in declaration order.
pub type Values = IndexMap<String, FieldValue>;

/// Error messages of failing fields only; a missing key means valid.
pub type Errors = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStatus {
    #[default]
    Pristine,
    Touched,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    SettledValid,
    SettledInvalid,
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub values: Values,
    pub errors: Errors,
    pub status: IndexMap<String, FieldStatus>,
    pub phase: FormPhase,
}

impl FormState {
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn status(&self, name: &str) -> FieldStatus {
        self.status.get(name).copied().unwrap_or_default()
    }

    pub fn is_dirty(&self) -> bool {
        self.status
            .values()
            .any(|status| *status != FieldStatus::Pristine)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Settle every field after a full validation pass.
    pub(crate) fn settle(&mut self, errors: Errors) {
        for (name, status) in self.status.iter_mut() {
            *status = if errors.contains_key(name) {
                FieldStatus::Invalid
            } else {
                FieldStatus::Valid
            };
        }
        self.phase = if errors.is_empty() {
            FormPhase::SettledValid
        } else {
            FormPhase::SettledInvalid
        };
        self.errors = errors;
    }
}

/// JSON object of `values`, with absent dates and times as `null`.
pub fn values_to_json(values: &Values) -> Map<String, Value> {
    values
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_marks_each_field() {
        let mut state = FormState::default();
        state.values.insert("a".into(), FieldValue::text("1"));
        state.values.insert("b".into(), FieldValue::text(""));
        state.status.insert("a".into(), FieldStatus::Touched);
        state.status.insert("b".into(), FieldStatus::Pristine);
        assert!(state.is_dirty());

        let mut errors = Errors::new();
        errors.insert("b".into(), "This field is required".into());
        state.settle(errors);

        assert_eq!(state.status("a"), FieldStatus::Valid);
        assert_eq!(state.status("b"), FieldStatus::Invalid);
        assert_eq!(state.phase, FormPhase::SettledInvalid);
        assert_eq!(state.error("b"), Some("This field is required"));
        assert!(!state.is_valid());
    }
}
