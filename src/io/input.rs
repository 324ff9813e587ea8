use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::form::FieldDescriptor;

use super::DocumentFormat;

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Field descriptors from a form document.
///
/// The document is either a list of fields or an object holding one under
/// `fields`.
pub fn load_fields_str(contents: &str, format: DocumentFormat) -> Result<Vec<FieldDescriptor>> {
    let document = parse_document_str(contents, format)?;
    load_fields_value(&document)
}

pub fn load_fields_value(document: &Value) -> Result<Vec<FieldDescriptor>> {
    let fields = match document {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("fields") {
            Some(Value::Array(items)) => items,
            Some(_) => bail!("`fields` must be a list of field definitions"),
            None => bail!("form document has no `fields` list"),
        },
        _ => bail!("form document must be a list of fields or an object with `fields`"),
    };
    fields
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            serde_json::from_value::<FieldDescriptor>(raw.clone()).with_context(|| {
                match raw.get("name").and_then(Value::as_str) {
                    Some(name) => format!("invalid field `{name}` (#{idx})"),
                    None => format!("invalid field #{idx}"),
                }
            })
        })
        .collect()
}

/// Initial values keyed by field name.
pub fn load_values_str(contents: &str, format: DocumentFormat) -> Result<Map<String, Value>> {
    match parse_document_str(contents, format)? {
        Value::Object(map) => Ok(map),
        other => bail!("values document must be an object, got {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldKind, FieldValidation};

    #[test]
    fn loads_top_level_list() {
        let fields = load_fields_str(
            r#"[
                {"name": "email", "label": "Email", "kind": "email",
                 "validators": ["validate_required", "validate_email"]},
                {"name": "birthday", "type": "date", "input": {"firstDayOfWeek": 1}}
            ]"#,
            DocumentFormat::Json,
        )
        .unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].kind, FieldKind::Email);
        assert!(matches!(&fields[0].validation, FieldValidation::Keys(keys) if keys.len() == 2));
        assert_eq!(fields[1].input.first_day_of_week, Some(1));
    }

    #[test]
    fn loads_fields_key_of_object() {
        let fields = load_fields_str(
            r#"{"title": "Signup", "fields": [{"name": "nickname"}]}"#,
            DocumentFormat::Json,
        )
        .unwrap();
        assert_eq!(fields[0].name, "nickname");
        assert_eq!(fields[0].kind, FieldKind::Text);
    }

    #[test]
    fn reports_the_broken_field() {
        let err = load_fields_str(
            r#"[{"name": "ok"}, {"name": "bad", "kind": "hologram"}]"#,
            DocumentFormat::Json,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid field `bad` (#1)"));

        let err = load_fields_str(r#"{"title": "x"}"#, DocumentFormat::Json).unwrap_err();
        assert!(err.to_string().contains("no `fields`"));
    }

    #[test]
    fn values_must_be_an_object() {
        let values = load_values_str(r#"{"email": "a@b.com"}"#, DocumentFormat::Json).unwrap();
        assert_eq!(values.len(), 1);
        assert!(load_values_str("[1, 2]", DocumentFormat::Json).is_err());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn loads_yaml_documents() {
        let fields = load_fields_str(
            "fields:\n  - name: start\n    kind: time\n    input:\n      hourFormat: 12h\n",
            DocumentFormat::Yaml,
        )
        .unwrap();
        assert_eq!(fields[0].kind, FieldKind::Time);
    }
}
