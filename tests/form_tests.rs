use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use chrono::NaiveDate;
use serde_json::json;

use fieldkit::{
    form::{FieldStatus, FormPhase, MemoryStore},
    io::{DocumentFormat, load_fields_str},
    prelude::*,
    validate::ValidationResult,
};

fn signup() -> Vec<FieldDescriptor> {
    load_fields_str(
        r#"{"fields": [
            {"name": "email", "type": "email",
             "validators": ["validate_required", "validate_email"]},
            {"name": "password", "type": "password",
             "validators": ["validate_required", "validate_password"]},
            {"name": "birthday", "type": "date", "inputProps": {"firstDayOfWeek": 1}}
        ]}"#,
        DocumentFormat::Json,
    )
    .unwrap()
}

#[test]
fn registry_runs_builtins_and_reports_unknown_keys() {
    let registry = ValidatorRegistry::new();
    assert!(
        registry
            .validate("validate_email", &FieldValue::text("a@b.co"), None)
            .success
    );
    let bad = registry.validate("validate_email", &FieldValue::text("a@b"), None);
    assert!(bad.fail);
    assert_eq!(bad.message.as_deref(), Some("Invalid email"));

    assert!(
        registry
            .validate("validate_password", &FieldValue::text("abc"), None)
            .fail
    );
    assert!(
        registry
            .validate("validate_password", &FieldValue::text("Abcdef12"), None)
            .success
    );

    let unknown = registry.validate("validate_zip", &FieldValue::text("12345"), None);
    assert!(unknown.fail);
    assert_eq!(unknown.key, "validate_zip");
    assert_eq!(unknown.message.as_deref(), Some("unknown validator: validate_zip"));
}

#[test]
fn submit_with_one_invalid_field_reports_only_that_field() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut form = DynamicForm::new(signup(), FormOptions::default()).unwrap();
    form.set_value("email", "ada@example.com").unwrap();

    let counter = calls.clone();
    let outcome = form.submit_with(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<(), String>(())
    });

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected invalid outcome, got {outcome:?}");
    };
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_key("password"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(form.phase(), FormPhase::SettledInvalid);
    assert_eq!(form.state().status("password"), FieldStatus::Invalid);
    assert_eq!(form.state().status("email"), FieldStatus::Valid);
}

#[test]
fn valid_submit_passes_values_to_callback() {
    let seen = Arc::new(Mutex::new(None));
    let mut form = DynamicForm::new(signup(), FormOptions::default()).unwrap();
    form.set_value("email", " Ada@Example.com ").unwrap();
    form.set_value("password", "Abcdef12").unwrap();
    form.set_value("birthday", "1990-04-01").unwrap();

    let sink = seen.clone();
    let outcome = form.submit_with(move |values| {
        *sink.lock().unwrap() = Some(values.clone());
        Ok::<(), String>(())
    });

    assert!(outcome.is_submitted());
    assert_eq!(form.phase(), FormPhase::SettledValid);
    let values = seen.lock().unwrap().clone().unwrap();
    assert_eq!(
        values["birthday"],
        FieldValue::from(NaiveDate::from_ymd_opt(1990, 4, 1).unwrap())
    );
    assert_eq!(form.values_json()["birthday"], json!("1990-04-01"));
}

#[test]
fn changes_are_mirrored_and_announced() {
    let store = MemoryStore::new();
    let deltas = Arc::new(Mutex::new(Vec::new()));
    let sink = deltas.clone();
    let options = FormOptions::default()
        .with_store(store.clone())
        .with_on_change(move |values, delta| {
            sink.lock()
                .unwrap()
                .push((delta.name.clone(), values.len()));
        });
    let mut form = DynamicForm::new(signup(), options).unwrap();

    form.set_value("email", "ada@example.com").unwrap();
    assert_eq!(store.get("email"), Some(json!("ada@example.com")));
    assert_eq!(*deltas.lock().unwrap(), vec![("email".to_string(), 3)]);
    assert!(form.is_dirty());
    assert!(matches!(
        form.set_value("nope", "x"),
        Err(FormError::UnknownField(name)) if name == "nope"
    ));
}

#[test]
fn custom_registry_rules_are_used_by_forms() {
    let mut registry = ValidatorRegistry::new();
    registry.add_rule("validate_even", |value, _| {
        let even = value
            .as_text()
            .parse::<i64>()
            .is_ok_and(|number| number % 2 == 0);
        ValidationResult::check("validate_even", even, "Must be even")
    });
    let fields = vec![FieldDescriptor::text("count").with_validators(["validate_even"])];
    let options = FormOptions::default()
        .with_registry(registry)
        .with_validate_on_change(true);
    let mut form = DynamicForm::new(fields, options).unwrap();

    form.set_value("count", "3").unwrap();
    assert_eq!(form.state().error("count"), Some("Must be even"));
    form.set_value("count", "4").unwrap();
    assert_eq!(form.state().error("count"), None);
}
