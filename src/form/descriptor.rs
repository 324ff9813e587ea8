use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    calendar::HourFormat,
    mask::{FormatKind, InputFormat},
    validate::{ValidatorKind, ValidatorRef},
    value::{FieldValue, ValueKind},
};

use super::{render::RendererKind, state::Values};

/// Declared input type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Password,
    Tel,
    Url,
    Number,
    Search,
    Date,
    Time,
}

impl FieldKind {
    pub fn value_kind(self) -> ValueKind {
        match self {
            FieldKind::Date => ValueKind::Date,
            FieldKind::Time => ValueKind::Time,
            _ => ValueKind::Text,
        }
    }

    pub fn renderer(self) -> RendererKind {
        match self {
            FieldKind::Date => RendererKind::Date,
            FieldKind::Time => RendererKind::Time,
            _ => RendererKind::Text,
        }
    }

    /// Formatter used when a field does not override `format`.
    pub fn default_format(self) -> FormatKind {
        match self {
            FieldKind::Tel => FormatKind::Tel,
            FieldKind::Email => FormatKind::Email,
            FieldKind::Url => FormatKind::Url,
            _ => FormatKind::None,
        }
    }
}

/// Per-field settings forwarded to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputOverrides {
    pub format: Option<FormatKind>,
    /// `x` marks a digit, e.g. `+91 xxxx xxx`.
    pub tel_pattern: Option<String>,
    pub helper_text: Option<String>,
    pub required: Option<bool>,
    pub first_day_of_week: Option<u32>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub hour_format: HourFormat,
    pub minute_step: Option<u32>,
    /// `HH:MM`
    pub min_time: Option<String>,
    /// `HH:MM`
    pub max_time: Option<String>,
}

pub type CustomValidator = Arc<dyn Fn(&FieldValue, &Values) -> Option<String> + Send + Sync>;

/// How a field is checked on submit.
#[derive(Clone, Default)]
pub enum FieldValidation {
    #[default]
    None,
    /// Registry keys run in order; the first failure wins.
    Keys(Vec<ValidatorRef>),
    /// Called with the field value and every current value. Panics are not
    /// caught by the form.
    Custom(CustomValidator),
}

impl fmt::Debug for FieldValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValidation::None => write!(f, "None"),
            FieldValidation::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
            FieldValidation::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(from = "FieldDocument")]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub placeholder: Option<String>,
    pub default: Option<Value>,
    pub validation: FieldValidation,
    pub input: InputOverrides,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind,
            placeholder: None,
            default: None,
            validation: FieldValidation::None,
            input: InputOverrides::default(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into().to_json());
        self
    }

    pub fn with_validators<I, V>(mut self, validators: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ValidatorRef>,
    {
        self.validation = FieldValidation::Keys(validators.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_custom_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&FieldValue, &Values) -> Option<String> + Send + Sync + 'static,
    {
        self.validation = FieldValidation::Custom(Arc::new(validator));
        self
    }

    pub fn with_input(mut self, input: InputOverrides) -> Self {
        self.input = input;
        self
    }

    pub fn with_tel_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.input.tel_pattern = Some(pattern.into());
        self
    }

    pub fn with_helper_text(mut self, text: impl Into<String>) -> Self {
        self.input.helper_text = Some(text.into());
        self
    }

    pub fn input_format(&self) -> InputFormat {
        let kind = self.input.format.unwrap_or(self.kind.default_format());
        InputFormat::from_kind(kind, self.input.tel_pattern.as_deref())
    }

    /// Explicit override, otherwise whether `validate_required` is listed.
    pub fn is_required(&self) -> bool {
        if let Some(required) = self.input.required {
            return required;
        }
        match &self.validation {
            FieldValidation::Keys(keys) => keys
                .iter()
                .any(|rule| ValidatorKind::from_key(rule.key()) == Some(ValidatorKind::Required)),
            _ => false,
        }
    }
}

/// Serialized shape of a field in a form document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldDocument {
    name: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default, alias = "type")]
    kind: FieldKind,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default, alias = "defaultValue")]
    default: Option<Value>,
    #[serde(default)]
    validators: Vec<ValidatorRef>,
    #[serde(default, alias = "inputProps")]
    input: InputOverrides,
}

impl From<FieldDocument> for FieldDescriptor {
    fn from(doc: FieldDocument) -> Self {
        let validation = if doc.validators.is_empty() {
            FieldValidation::None
        } else {
            FieldValidation::Keys(doc.validators)
        };
        Self {
            label: doc.label.unwrap_or_else(|| doc.name.clone()),
            name: doc.name,
            kind: doc.kind,
            placeholder: doc.placeholder,
            default: doc.default,
            validation,
            input: doc.input,
        }
    }
}
