use std::{borrow::Cow, fmt, sync::Arc};

use crate::validate::ValidatorRegistry;

use super::{engine::Delta, state::Values, store::StoreMirror};

pub type ChangeCallback = Arc<dyn Fn(&Values, &Delta) + Send + Sync>;
pub type SubmitGate = Arc<dyn Fn(&Values) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct FormOptions {
    pub validate_on_change: bool,
    pub submit_label: Cow<'static, str>,
    pub(crate) registry: Arc<ValidatorRegistry>,
    pub(crate) store: Option<Arc<dyn StoreMirror>>,
    pub(crate) on_change: Option<ChangeCallback>,
    pub(crate) submit_disabled: Option<SubmitGate>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_on_change: false,
            submit_label: Cow::Borrowed("Submit"),
            registry: Arc::new(ValidatorRegistry::default()),
            store: None,
            on_change: None,
            submit_disabled: None,
        }
    }
}

impl FormOptions {
    pub fn with_store(mut self, store: impl StoreMirror + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn with_shared_store(mut self, store: Arc<dyn StoreMirror>) -> Self {
        self.store = Some(store);
        self
    }

    /// Called after every successful `set_value` with all values and the delta.
    pub fn with_on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Values, &Delta) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    /// Re-run the changed field's validators on each `set_value`.
    pub fn with_validate_on_change(mut self, enabled: bool) -> Self {
        self.validate_on_change = enabled;
        self
    }

    pub fn with_submit_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.submit_label = label.into();
        self
    }

    /// Submission is refused while `predicate` holds for the current values.
    pub fn with_submit_disabled<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Values) -> bool + Send + Sync + 'static,
    {
        self.submit_disabled = Some(Arc::new(predicate));
        self
    }

    pub fn with_registry(mut self, registry: ValidatorRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }
}

impl fmt::Debug for FormOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOptions")
            .field("validate_on_change", &self.validate_on_change)
            .field("submit_label", &self.submit_label)
            .field("registry", &self.registry)
            .field("store", &self.store.is_some())
            .field("on_change", &self.on_change.is_some())
            .field("submit_disabled", &self.submit_disabled.is_some())
            .finish()
    }
}
