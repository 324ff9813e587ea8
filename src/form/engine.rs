use std::{
    collections::HashSet,
    fmt::Display,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    calendar::CalendarError,
    validate::ValidatorRegistry,
    value::FieldValue,
};

use super::{
    descriptor::{FieldDescriptor, FieldValidation},
    error::FormError,
    options::FormOptions,
    render::{ChangeHandler, FieldProps, SelectionDetail},
    state::{Errors, FieldStatus, FormPhase, FormState, Values, values_to_json},
};

/// The single field touched by the latest update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delta {
    pub name: String,
    pub value: FieldValue,
    /// Picker breakdown when the change came from a date or time renderer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<SelectionDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every field validated and the callback accepted the values.
    Submitted(Values),
    /// At least one field failed; carries every error.
    Invalid(Errors),
    /// Fields were valid but the submit callback returned an error.
    Rejected(String),
    /// The submit gate refused the current values.
    Disabled,
    /// Another submission is still in flight.
    Busy,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

/// Proof that validation passed; hand it back to [`DynamicForm::finish_submit`].
///
/// Dropping a ticket unfinished (or cancelling `submit_async`) releases the
/// form for the next submission.
#[derive(Debug)]
#[must_use = "the submission is abandoned when the ticket is dropped"]
pub struct SubmitTicket {
    values: Values,
    _busy: BusyGuard,
}

/// Clears the form's in-flight flag when dropped.
#[derive(Debug)]
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SubmitTicket {
    pub fn values(&self) -> &Values {
        &self.values
    }
}

/// A configuration-driven form: descriptors in, values and errors out.
#[derive(Debug)]
pub struct DynamicForm {
    fields: Vec<FieldDescriptor>,
    options: FormOptions,
    state: FormState,
    in_flight: Arc<AtomicBool>,
}

impl DynamicForm {
    pub fn new(fields: Vec<FieldDescriptor>, options: FormOptions) -> Result<Self, FormError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
            if let Some(first_day) = field.input.first_day_of_week
                && first_day > 6
            {
                return Err(FormError::Calendar {
                    name: field.name.clone(),
                    source: CalendarError::FirstDayOfWeek(first_day),
                });
            }
        }
        let mut form = Self {
            fields,
            options,
            state: FormState::default(),
            in_flight: Arc::default(),
        };
        form.initialize(&Map::new())?;
        Ok(form)
    }

    /// Reseed every value and reset errors and statuses.
    ///
    /// Priority per field: `initial` entry, declared default, mirrored store
    /// value, then the empty value of the field's kind.
    pub fn initialize(&mut self, initial: &Map<String, Value>) -> Result<&FormState, FormError> {
        let stored = self
            .options
            .store
            .as_ref()
            .and_then(|store| store.get_state())
            .unwrap_or_default();

        let mut state = FormState::default();
        for field in &self.fields {
            let kind = field.kind.value_kind();
            let source = initial
                .get(&field.name)
                .or(field.default.as_ref())
                .or_else(|| stored.get(&field.name));
            let value = match source {
                Some(raw) => {
                    FieldValue::from_json(kind, raw).map_err(|source| FormError::InvalidValue {
                        name: field.name.clone(),
                        source,
                    })?
                }
                None => FieldValue::empty(kind),
            };
            state.values.insert(field.name.clone(), value);
            state.status.insert(field.name.clone(), FieldStatus::Pristine);
        }
        debug!(fields = self.fields.len(), "form initialized");
        self.state = state;
        self.in_flight.store(false, Ordering::Release);
        Ok(&self.state)
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &Values {
        &self.state.values
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.state.value(name)
    }

    pub fn errors(&self) -> &Errors {
        &self.state.errors
    }

    pub fn phase(&self) -> FormPhase {
        self.state.phase
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn values_json(&self) -> Map<String, Value> {
        values_to_json(&self.state.values)
    }

    pub fn submit_label(&self) -> &str {
        &self.options.submit_label
    }

    pub fn is_submit_disabled(&self) -> bool {
        self.options
            .submit_disabled
            .as_ref()
            .is_some_and(|gate| gate(&self.state.values))
    }

    /// Update one field, mirror it to the store and notify the change callback.
    pub fn set_value(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Delta, FormError> {
        self.set_value_with_detail(name, value, None)
    }

    /// [`DynamicForm::set_value`], passing a picker's selection detail on to
    /// the change callback.
    pub fn set_value_with_detail(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
        detail: Option<SelectionDetail>,
    ) -> Result<Delta, FormError> {
        let field = self
            .fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let value = value
            .into()
            .coerce(field.kind.value_kind())
            .map_err(|source| FormError::InvalidValue {
                name: name.to_string(),
                source,
            })?;

        self.state.values.insert(name.to_string(), value.clone());
        self.state.status.insert(name.to_string(), FieldStatus::Touched);

        if let Some(store) = &self.options.store {
            let mut partial = Map::new();
            partial.insert(name.to_string(), value.to_json());
            store.set_state(partial);
            debug!(field = name, "value mirrored to store");
        }

        if self.options.validate_on_change {
            let error = compute_field_error(field, &value, &self.state.values, &self.options.registry);
            let status = if error.is_some() {
                FieldStatus::Invalid
            } else {
                FieldStatus::Valid
            };
            self.state.status.insert(name.to_string(), status);
            match error {
                Some(message) => {
                    self.state.errors.insert(name.to_string(), message);
                }
                None => {
                    self.state.errors.shift_remove(name);
                }
            }
        }

        debug!(field = name, value = %value, "field updated");
        let delta = Delta {
            name: name.to_string(),
            value,
            detail,
        };
        if let Some(callback) = &self.options.on_change {
            callback(&self.state.values, &delta);
        }
        Ok(delta)
    }

    /// Errors of every field, validated regardless of status.
    pub fn validate_all(&self) -> Errors {
        let mut errors = Errors::new();
        for field in &self.fields {
            let value = self
                .state
                .values
                .get(&field.name)
                .cloned()
                .unwrap_or_else(|| FieldValue::empty(field.kind.value_kind()));
            if let Some(message) =
                compute_field_error(field, &value, &self.state.values, &self.options.registry)
            {
                errors.insert(field.name.clone(), message);
            }
        }
        errors
    }

    /// Validate everything and, when valid, hand out a ticket for the
    /// caller to complete the submission with.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitOutcome> {
        if self.is_submitting() {
            debug!("submit ignored while another is in flight");
            return Err(SubmitOutcome::Busy);
        }
        if self.is_submit_disabled() {
            debug!("submit refused by gate");
            return Err(SubmitOutcome::Disabled);
        }
        self.state.phase = FormPhase::Submitting;
        let errors = self.validate_all();
        if !errors.is_empty() {
            debug!(invalid = errors.len(), "submit blocked by validation");
            self.state.settle(errors.clone());
            return Err(SubmitOutcome::Invalid(errors));
        }
        self.in_flight.store(true, Ordering::Release);
        Ok(SubmitTicket {
            values: self.state.values.clone(),
            _busy: BusyGuard(Arc::clone(&self.in_flight)),
        })
    }

    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<(), String>,
    ) -> SubmitOutcome {
        self.in_flight.store(false, Ordering::Release);
        self.state.settle(Errors::new());
        match result {
            Ok(()) => {
                info!(fields = ticket.values.len(), "form submitted");
                SubmitOutcome::Submitted(ticket.values)
            }
            Err(message) => {
                debug!(%message, "submit callback rejected values");
                SubmitOutcome::Rejected(message)
            }
        }
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        self.submit_with(|_| Ok::<(), String>(()))
    }

    /// `callback` runs only when every field is valid.
    pub fn submit_with<F, E>(&mut self, callback: F) -> SubmitOutcome
    where
        F: FnOnce(&Values) -> Result<(), E>,
        E: Display,
    {
        let ticket = match self.begin_submit() {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };
        let result = callback(ticket.values()).map_err(|err| err.to_string());
        self.finish_submit(ticket, result)
    }

    pub async fn submit_async<F, Fut, E>(&mut self, callback: F) -> SubmitOutcome
    where
        F: FnOnce(Values) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let ticket = match self.begin_submit() {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };
        let result = callback(ticket.values().clone())
            .await
            .map_err(|err| err.to_string());
        self.finish_submit(ticket, result)
    }

    /// Renderer inputs for the field called `name`.
    pub fn field_props(&self, name: &str, focused: bool) -> Option<FieldProps<'_>> {
        let index = self.fields.iter().position(|field| field.name == name)?;
        self.field_props_at(index, focused)
    }

    pub fn field_props_at(&self, index: usize, focused: bool) -> Option<FieldProps<'_>> {
        let descriptor = self.fields.get(index)?;
        let value = self.state.values.get(&descriptor.name)?;
        Some(FieldProps {
            descriptor,
            name: &descriptor.name,
            label: &descriptor.label,
            value,
            on_change: ChangeHandler::new(&descriptor.name),
            error: self.state.error(&descriptor.name),
            helper_text: descriptor.input.helper_text.as_deref(),
            placeholder: descriptor.placeholder.as_deref(),
            required: descriptor.is_required(),
            focused,
            input: &descriptor.input,
            format: descriptor.input_format(),
        })
    }
}

/// First failing message for `value`, or `None` when it is valid.
///
/// Listed validator keys run in order and stop at the first failure; a
/// custom validator's result is used as is.
pub fn compute_field_error(
    descriptor: &FieldDescriptor,
    value: &FieldValue,
    all_values: &Values,
    registry: &ValidatorRegistry,
) -> Option<String> {
    match &descriptor.validation {
        FieldValidation::None => None,
        FieldValidation::Keys(keys) => keys.iter().find_map(|rule| {
            let result = registry.validate_ref(rule, value);
            result.fail.then(|| {
                result
                    .message
                    .unwrap_or_else(|| format!("{} failed", rule.key()))
            })
        }),
        FieldValidation::Custom(validator) => validator(value, all_values),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::form::store::StoreMirror;
    use crate::{
        form::{FieldKind, InputOverrides, MemoryStore},
        validate::{ValidationResult, ValidatorKind},
    };

    fn signup_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("email", FieldKind::Email)
                .with_validators([ValidatorKind::Required, ValidatorKind::Email]),
            FieldDescriptor::text("nickname"),
        ]
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let fields = vec![FieldDescriptor::text("a"), FieldDescriptor::text("a")];
        let err = DynamicForm::new(fields, FormOptions::default()).unwrap_err();
        assert_eq!(err, FormError::DuplicateField("a".into()));
    }

    #[test]
    fn out_of_range_first_day_is_a_configuration_error() {
        let field = FieldDescriptor::new("when", FieldKind::Date).with_input(InputOverrides {
            first_day_of_week: Some(7),
            ..InputOverrides::default()
        });
        let err = DynamicForm::new(vec![field], FormOptions::default()).unwrap_err();
        assert!(matches!(err, FormError::Calendar { .. }));
    }

    #[test]
    fn initialization_priority() {
        let store = MemoryStore::new();
        let mut seeded = Map::new();
        seeded.insert("a".into(), json!("from-store"));
        seeded.insert("b".into(), json!("from-store"));
        seeded.insert("c".into(), json!("from-store"));
        store.set_state(seeded);

        let fields = vec![
            FieldDescriptor::text("a").with_default("default"),
            FieldDescriptor::text("b").with_default("default"),
            FieldDescriptor::text("c"),
            FieldDescriptor::text("d"),
            FieldDescriptor::new("when", FieldKind::Date),
        ];
        let mut form =
            DynamicForm::new(fields, FormOptions::default().with_store(store)).unwrap();
        let mut initial = Map::new();
        initial.insert("a".into(), json!("initial"));
        form.initialize(&initial).unwrap();

        assert_eq!(form.value("a"), Some(&FieldValue::text("initial")));
        assert_eq!(form.value("b"), Some(&FieldValue::text("default")));
        assert_eq!(form.value("c"), Some(&FieldValue::text("from-store")));
        assert_eq!(form.value("d"), Some(&FieldValue::text("")));
        assert_eq!(form.value("when"), Some(&FieldValue::Date(None)));
    }

    #[test]
    fn incompatible_initial_value_is_reported() {
        let mut form = DynamicForm::new(
            vec![FieldDescriptor::new("when", FieldKind::Date)],
            FormOptions::default(),
        )
        .unwrap();
        let mut initial = Map::new();
        initial.insert("when".into(), json!("next tuesday"));
        assert!(matches!(
            form.initialize(&initial),
            Err(FormError::InvalidValue { .. })
        ));
    }

    #[test]
    fn set_value_mirrors_and_notifies_without_validating() {
        let store = MemoryStore::new();
        let seen: Arc<Mutex<Vec<Delta>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let options = FormOptions::default()
            .with_store(store.clone())
            .with_on_change(move |values, delta| {
                assert_eq!(values.get(&delta.name), Some(&delta.value));
                sink.lock().unwrap().push(delta.clone());
            });
        let mut form = DynamicForm::new(signup_fields(), options).unwrap();

        let delta = form.set_value("email", "not-an-email").unwrap();
        assert_eq!(delta.name, "email");
        assert_eq!(store.get("email"), Some(json!("not-an-email")));
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(form.errors().is_empty());
        assert_eq!(form.state().status("email"), FieldStatus::Touched);
        assert_eq!(form.state().status("nickname"), FieldStatus::Pristine);
    }

    #[test]
    fn validate_on_change_updates_the_changed_field_only() {
        let options = FormOptions::default().with_validate_on_change(true);
        let mut form = DynamicForm::new(signup_fields(), options).unwrap();
        form.set_value("email", "nope").unwrap();
        assert_eq!(form.state().error("email"), Some("Invalid email"));
        form.set_value("email", "a@b.com").unwrap();
        assert!(form.errors().is_empty());
        assert_eq!(form.state().status("email"), FieldStatus::Valid);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut form = DynamicForm::new(signup_fields(), FormOptions::default()).unwrap();
        assert_eq!(
            form.set_value("missing", "x"),
            Err(FormError::UnknownField("missing".into()))
        );
    }

    #[test]
    fn date_fields_parse_text_input() {
        let mut form = DynamicForm::new(
            vec![FieldDescriptor::new("when", FieldKind::Date)],
            FormOptions::default(),
        )
        .unwrap();
        form.set_value("when", "2024-03-15").unwrap();
        assert_eq!(
            form.value("when").and_then(FieldValue::as_date),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert!(form.set_value("when", "someday").is_err());
    }

    #[test]
    fn validators_short_circuit_on_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = ValidatorRegistry::new();
        registry.add_rule("counting", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            ValidationResult::pass("counting")
        });
        let field = FieldDescriptor::text("name").with_validators(["validate_required", "counting"]);
        let values = Values::new();

        let error = compute_field_error(&field, &FieldValue::text(""), &values, &registry);
        assert_eq!(error.as_deref(), Some("This field is required"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(compute_field_error(&field, &FieldValue::text("x"), &values, &registry), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn custom_validator_sees_all_values() {
        let fields = vec![
            FieldDescriptor::new("password", FieldKind::Password),
            FieldDescriptor::new("confirm", FieldKind::Password).with_custom_validator(
                |value, all| {
                    (all.get("password") != Some(value)).then(|| "Passwords differ".to_string())
                },
            ),
        ];
        let mut form = DynamicForm::new(fields, FormOptions::default()).unwrap();
        form.set_value("password", "Abcdef12").unwrap();
        form.set_value("confirm", "Abcdef13").unwrap();
        let SubmitOutcome::Invalid(errors) = form.submit() else {
            panic!("expected invalid outcome");
        };
        assert_eq!(errors.get("confirm").map(String::as_str), Some("Passwords differ"));
    }

    #[test]
    fn submit_gate_and_rejection() {
        let options = FormOptions::default()
            .with_submit_label("Create account")
            .with_submit_disabled(|values| {
                values.get("nickname").is_some_and(FieldValue::is_blank)
            });
        let mut form = DynamicForm::new(signup_fields(), options).unwrap();
        assert_eq!(form.submit_label(), "Create account");
        form.set_value("email", "a@b.com").unwrap();
        assert_eq!(form.submit(), SubmitOutcome::Disabled);

        form.set_value("nickname", "ada").unwrap();
        let outcome = form.submit_with(|_| Err::<(), _>("server said no"));
        assert_eq!(outcome, SubmitOutcome::Rejected("server said no".into()));
        assert!(!form.is_submitting());
    }

    #[test]
    fn second_submit_while_in_flight_is_busy() {
        let mut form = DynamicForm::new(vec![FieldDescriptor::text("a")], FormOptions::default())
            .unwrap();
        let ticket = form.begin_submit().unwrap();
        assert_eq!(form.phase(), FormPhase::Submitting);
        assert!(matches!(form.begin_submit(), Err(SubmitOutcome::Busy)));
        let outcome = form.finish_submit(ticket, Ok(()));
        assert!(outcome.is_submitted());
        assert_eq!(form.phase(), FormPhase::SettledValid);
    }

    #[test]
    fn dropped_ticket_releases_the_form() {
        let mut form = DynamicForm::new(vec![FieldDescriptor::text("a")], FormOptions::default())
            .unwrap();
        let ticket = form.begin_submit().unwrap();
        assert!(form.is_submitting());
        drop(ticket);
        assert!(!form.is_submitting());
        assert!(form.submit().is_submitted());
    }

    #[test]
    fn cancelled_async_submit_releases_the_form() {
        let mut form = DynamicForm::new(vec![FieldDescriptor::text("a")], FormOptions::default())
            .unwrap();
        {
            let pending = form.submit_async(|_| futures::future::pending::<Result<(), String>>());
            let mut pending = Box::pin(pending);
            let waker = futures::task::noop_waker();
            let mut cx = std::task::Context::from_waker(&waker);
            assert!(pending.as_mut().poll(&mut cx).is_pending());
        }
        assert!(!form.is_submitting());
        assert!(form.submit().is_submitted());
    }

    #[test]
    fn async_submit_awaits_callback() {
        let mut form = DynamicForm::new(signup_fields(), FormOptions::default()).unwrap();
        form.set_value("email", "a@b.com").unwrap();
        let outcome = futures::executor::block_on(form.submit_async(|values| async move {
            assert_eq!(values.len(), 2);
            Ok::<(), String>(())
        }));
        assert!(outcome.is_submitted());
    }

    #[test]
    fn props_carry_error_and_overrides() {
        let fields = vec![
            FieldDescriptor::new("phone", FieldKind::Tel)
                .with_label("Phone")
                .with_validators([ValidatorKind::Required])
                .with_tel_pattern("+91 xxxx xxx")
                .with_helper_text("Mobile only"),
        ];
        let mut form = DynamicForm::new(fields, FormOptions::default()).unwrap();
        let _ = form.submit();
        let props = form.field_props("phone", true).unwrap();
        assert_eq!(props.label, "Phone");
        assert!(props.required);
        assert_eq!(props.error, Some("This field is required"));
        assert_eq!(props.message(), Some("This field is required"));
        assert_eq!(props.on_change.name(), "phone");
        assert!(props.format.template().is_some());
        assert!(form.field_props("missing", false).is_none());
    }
}
