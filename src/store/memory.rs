//! In-memory preference store

use super::PreferenceStore;
use crate::error::{Error, Result};
use crate::events::{ChangeCallback, ListenerId, ListenerRegistry, PreferenceChangeEvent};
use crate::sync::RwLockExt;
use crate::value::PreferenceValue;
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory preference storage (not persisted)
///
/// Explicit values are coerced to the type of their registered default, so
/// a value loaded from disk as a string reads back as an int once the
/// block that owns it has registered an int default.
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, PreferenceValue>>,
    defaults: RwLock<HashMap<String, PreferenceValue>>,
    dirty: AtomicBool,
    listeners: ListenerRegistry,
}

impl MemoryPreferenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            defaults: RwLock::new(HashMap::new()),
            dirty: AtomicBool::new(false),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Create a store with the given defaults registered
    #[must_use]
    pub fn with_defaults<I, K>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, PreferenceValue)>,
        K: Into<String>,
    {
        let store = Self::new();
        {
            let mut guard = store.defaults.write_recovered();
            for (name, value) in defaults {
                guard.insert(name.into(), value);
            }
        }
        store
    }

    /// Number of registered change listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Replace every explicit value with `entries`, without marking the store dirty
    ///
    /// Listeners are notified for each name whose effective value changed.
    pub(crate) fn replace_entries(&self, entries: BTreeMap<String, String>) {
        let new_values: HashMap<String, PreferenceValue> = entries
            .into_iter()
            .map(|(name, text)| (name, PreferenceValue::String(text)))
            .collect();

        let mut names: Vec<String> = self.values.read_recovered().keys().cloned().collect();
        names.extend(new_values.keys().cloned());
        names.sort();
        names.dedup();

        let before: Vec<Option<PreferenceValue>> =
            names.iter().map(|name| self.value(name)).collect();
        *self.values.write_recovered() = new_values;
        self.dirty.store(false, Ordering::SeqCst);

        for (name, old_value) in names.iter().zip(before) {
            let new_value = self.value(name);
            if old_value != new_value {
                self.listeners
                    .notify(&PreferenceChangeEvent::new(name.clone(), old_value, new_value));
            }
        }
    }

    /// Explicit values in canonical string form, sorted by name
    pub(crate) fn entries(&self) -> BTreeMap<String, String> {
        self.values
            .read_recovered()
            .iter()
            .map(|(name, value)| (name.clone(), value.to_storage_string()))
            .collect()
    }

    pub(crate) fn mark_saved(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Fit `value` to the type of the registered default for `name`
    fn fit_to_default(
        name: &str,
        value: PreferenceValue,
        default: Option<&PreferenceValue>,
    ) -> Result<PreferenceValue> {
        let Some(default) = default else {
            return Ok(value);
        };
        let declared = default.preference_type();
        if declared.accepts(value.preference_type()) {
            return value.widen_to(name, declared);
        }
        if let PreferenceValue::String(text) = &value {
            return PreferenceValue::parse(declared, text).map_err(|e| Error::InvalidValue {
                key: name.to_string(),
                reason: e.to_string(),
            });
        }
        Err(Error::InvalidKeyType {
            key: name.to_string(),
            declared,
            actual: value.preference_type(),
        })
    }
}

impl Default for MemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, name: &str) -> Option<PreferenceValue> {
        let value = self.values.read_recovered().get(name).cloned()?;
        let Some(default) = self.get_default(name) else {
            return Some(value);
        };
        match value.coerce(default.preference_type()) {
            Some(coerced) => Some(coerced),
            None => {
                warn!(
                    "Ignoring stored value '{value}' for {name}: expected {}",
                    default.preference_type()
                );
                None
            }
        }
    }

    fn get_default(&self, name: &str) -> Option<PreferenceValue> {
        self.defaults.read_recovered().get(name).cloned()
    }

    fn is_default(&self, name: &str) -> bool {
        !self.values.read_recovered().contains_key(name)
    }

    fn set(&self, name: &str, value: PreferenceValue) -> Result<()> {
        let default = self.get_default(name);
        let value = Self::fit_to_default(name, value, default.as_ref())?;
        let old_value = self.value(name);

        {
            let mut values = self.values.write_recovered();
            if default.as_ref() == Some(&value) {
                values.remove(name);
            } else {
                values.insert(name.to_string(), value);
            }
        }

        let new_value = self.value(name);
        if old_value != new_value {
            debug!("Preference {name} changed");
            self.dirty.store(true, Ordering::SeqCst);
            self.listeners
                .notify(&PreferenceChangeEvent::new(name, old_value, new_value));
        }
        Ok(())
    }

    fn set_default(&self, name: &str, value: PreferenceValue) {
        self.defaults
            .write_recovered()
            .insert(name.to_string(), value);
    }

    fn set_to_default(&self, name: &str) -> Result<()> {
        let old_value = self.value(name);
        let removed = self.values.write_recovered().remove(name).is_some();
        if removed {
            self.dirty.store(true, Ordering::SeqCst);
            let new_value = self.value(name);
            if old_value != new_value {
                self.listeners
                    .notify(&PreferenceChangeEvent::new(name, old_value, new_value));
            }
        }
        Ok(())
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.read_recovered().keys().cloned().collect();
        names.sort();
        names
    }

    fn save(&self) -> Result<()> {
        self.mark_saved();
        Ok(())
    }

    fn needs_saving(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn on_change(&self, callback: ChangeCallback) -> ListenerId {
        self.listeners.on_change(move |event| callback(event))
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;

    fn store() -> MemoryPreferenceStore {
        MemoryPreferenceStore::with_defaults([
            ("editor.folding", PreferenceValue::Boolean(true)),
            ("editor.tab_width", PreferenceValue::Int(4)),
            ("editor.wrap_column", PreferenceValue::Long(80)),
        ])
    }

    #[test]
    fn test_defaults_and_explicit_values() {
        let store = store();
        assert_eq!(store.get_int("editor.tab_width"), 4);
        assert!(store.is_default("editor.tab_width"));

        store.set("editor.tab_width", PreferenceValue::Int(8)).unwrap();
        assert_eq!(store.get_int("editor.tab_width"), 8);
        assert!(!store.is_default("editor.tab_width"));
        assert!(store.needs_saving());
    }

    #[test]
    fn test_setting_default_value_removes_explicit_value() {
        let store = store();
        store.set("editor.tab_width", PreferenceValue::Int(8)).unwrap();
        store.set("editor.tab_width", PreferenceValue::Int(4)).unwrap();

        assert!(store.is_default("editor.tab_width"));
        assert!(store.names().is_empty());
    }

    #[test]
    fn test_type_checked_against_default() {
        let store = store();
        let err = store
            .set("editor.folding", PreferenceValue::Int(1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKeyType { .. }));

        // Widening and string parsing are accepted
        store
            .set("editor.wrap_column", PreferenceValue::Int(100))
            .unwrap();
        assert_eq!(store.get("editor.wrap_column"), Some(PreferenceValue::Long(100)));
        store.set("editor.tab_width", "2".into()).unwrap();
        assert_eq!(store.get("editor.tab_width"), Some(PreferenceValue::Int(2)));
    }

    #[test]
    fn test_unknown_names_hold_anything() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get_string("missing"), "");
        assert!(!store.get_boolean("missing"));
        assert!(!store.contains("missing"));

        store.set("free.form", PreferenceValue::from("x")).unwrap();
        assert_eq!(store.get_string("free.form"), "x");
    }

    #[test]
    fn test_listeners_see_effective_changes_only() {
        let store = store();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let id = store.on_change(Arc::new(move |event: &PreferenceChangeEvent| {
            sink.lock().unwrap().push(event.clone());
        }));

        store.set("editor.tab_width", PreferenceValue::Int(8)).unwrap();
        store.set("editor.tab_width", PreferenceValue::Int(8)).unwrap();
        store.set_to_default("editor.tab_width").unwrap();

        {
            let events = events.lock().unwrap();
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].old_value, Some(PreferenceValue::Int(4)));
            assert_eq!(events[0].new_value, Some(PreferenceValue::Int(8)));
            assert_eq!(events[1].new_value, Some(PreferenceValue::Int(4)));
        }

        assert!(store.remove_listener(id));
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_replace_entries_coerces_on_read() {
        let store = store();
        let mut entries = BTreeMap::new();
        entries.insert("editor.tab_width".to_string(), "6".to_string());
        entries.insert("editor.folding".to_string(), "not-a-bool".to_string());
        store.replace_entries(entries);

        assert_eq!(store.get_int("editor.tab_width"), 6);
        // Unparseable value falls back to the default
        assert!(store.get_boolean("editor.folding"));
        assert!(!store.needs_saving());
    }

    #[test]
    fn test_unreadable_value_is_not_default() {
        let store = store();
        let mut entries = BTreeMap::new();
        entries.insert("editor.folding".to_string(), "not-a-bool".to_string());
        store.replace_entries(entries);

        assert_eq!(store.get("editor.folding"), None);
        assert!(!store.is_default("editor.folding"));
        assert_eq!(store.names(), ["editor.folding"]);

        store.set_to_default("editor.folding").unwrap();
        assert!(store.is_default("editor.folding"));
        assert!(store.names().is_empty());
    }
}
