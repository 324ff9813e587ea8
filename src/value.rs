use std::{borrow::Cow, fmt};

use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Storage shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Date,
    Time,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Text => write!(f, "text"),
            ValueKind::Date => write!(f, "date (YYYY-MM-DD)"),
            ValueKind::Time => write!(f, "time (HH:MM)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, got {found}")]
pub struct ValueError {
    pub expected: ValueKind,
    pub found: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn empty(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Text => FieldValue::Text(String::new()),
            ValueKind::Date => FieldValue::Date(None),
            ValueKind::Time => FieldValue::Time(None),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Date(_) => ValueKind::Date,
            FieldValue::Time(_) => ValueKind::Time,
        }
    }

    /// Empty text (after trimming) or an absent date/time.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Date(date) => date.is_none(),
            FieldValue::Time(time) => time.is_none(),
        }
    }

    /// Textual form used by string-based validators.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(text) => Cow::Borrowed(text.as_str()),
            FieldValue::Date(Some(date)) => Cow::Owned(date.format("%Y-%m-%d").to_string()),
            FieldValue::Time(Some(time)) => Cow::Owned(time.format("%H:%M").to_string()),
            FieldValue::Date(None) | FieldValue::Time(None) => Cow::Borrowed(""),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => *date,
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            FieldValue::Time(time) => *time,
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Date(None) | FieldValue::Time(None) => Value::Null,
            other => Value::String(other.as_text().into_owned()),
        }
    }

    /// Coerce a JSON value into the storage shape `kind`.
    pub fn from_json(kind: ValueKind, value: &Value) -> Result<Self, ValueError> {
        let mismatch = || ValueError {
            expected: kind,
            found: value.to_string(),
        };
        match (kind, value) {
            (ValueKind::Text, Value::String(text)) => Ok(FieldValue::Text(text.clone())),
            (ValueKind::Text, Value::Number(num)) => Ok(FieldValue::Text(num.to_string())),
            (ValueKind::Text, Value::Bool(flag)) => Ok(FieldValue::Text(flag.to_string())),
            (ValueKind::Text, Value::Null) => Ok(FieldValue::Text(String::new())),
            (ValueKind::Date, Value::Null) => Ok(FieldValue::Date(None)),
            (ValueKind::Date, Value::String(raw)) if raw.trim().is_empty() => {
                Ok(FieldValue::Date(None))
            }
            (ValueKind::Date, Value::String(raw)) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(|date| FieldValue::Date(Some(date)))
                .map_err(|_| mismatch()),
            (ValueKind::Time, Value::Null) => Ok(FieldValue::Time(None)),
            (ValueKind::Time, Value::String(raw)) if raw.trim().is_empty() => {
                Ok(FieldValue::Time(None))
            }
            (ValueKind::Time, Value::String(raw)) => parse_time(raw.trim())
                .map(|time| FieldValue::Time(Some(time)))
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        }
    }

    /// Reinterpret this value for `kind`, parsing text when needed.
    pub fn coerce(self, kind: ValueKind) -> Result<Self, ValueError> {
        if self.kind() == kind {
            return Ok(self);
        }
        FieldValue::from_json(kind, &self.to_json())
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(Some(value))
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(value: NaiveTime) -> Self {
        FieldValue::Time(Some(value))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_round_trip_per_kind() {
        let date = FieldValue::from_json(ValueKind::Date, &json!("2024-02-29")).unwrap();
        assert_eq!(date.to_json(), json!("2024-02-29"));
        let time = FieldValue::from_json(ValueKind::Time, &json!("07:30")).unwrap();
        assert_eq!(time.to_json(), json!("07:30"));
        let empty = FieldValue::from_json(ValueKind::Date, &json!(null)).unwrap();
        assert_eq!(empty, FieldValue::Date(None));
        assert_eq!(empty.to_json(), Value::Null);
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let err = FieldValue::from_json(ValueKind::Date, &json!("next tuesday")).unwrap_err();
        assert_eq!(err.expected, ValueKind::Date);
        assert!(FieldValue::from_json(ValueKind::Text, &json!([1, 2])).is_err());
    }

    #[test]
    fn coerces_text_into_dates() {
        let value = FieldValue::text("2024-01-05").coerce(ValueKind::Date).unwrap();
        assert_eq!(value.as_date(), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert!(FieldValue::text("  ").is_blank());
    }
}
