//! One-way mirror of form values into an external key-value store.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};

/// Target the form mirrors every change into.
///
/// The store is read once, during initialization, and is never treated as the
/// source of truth afterwards.
pub trait StoreMirror: Send + Sync {
    /// Current contents, if the store exposes them.
    fn get_state(&self) -> Option<Map<String, Value>> {
        None
    }

    /// Merge `partial` into the store.
    fn set_state(&self, partial: Map<String, Value>);
}

/// Shared in-memory store. Clones see the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: Map<String, Value>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Map<String, Value>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StoreMirror for MemoryStore {
    fn get_state(&self) -> Option<Map<String, Value>> {
        Some(self.snapshot())
    }

    fn set_state(&self, partial: Map<String, Value>) {
        let mut state = self.lock();
        for (key, value) in partial {
            state.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_state_merges_partial_updates() {
        let store = MemoryStore::new();
        let mut first = Map::new();
        first.insert("email".into(), json!("a@b.com"));
        store.set_state(first);
        let mut second = Map::new();
        second.insert("phone".into(), json!("(555"));
        store.set_state(second);

        let clone = store.clone();
        assert_eq!(clone.get("email"), Some(json!("a@b.com")));
        assert_eq!(clone.snapshot().len(), 2);
    }
}
