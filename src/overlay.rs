//! Overlay preference store
//!
//! An [`OverlayPreferenceStore`] sits in front of a shared
//! [`PreferenceStore`] and buffers a page's edits. Reads fall through to the
//! underlying store until a key is staged; nothing reaches the underlying
//! store until [`propagate`](OverlayPreferenceStore::propagate) is called,
//! so cancelling a dialog never touches process-wide settings.
//!
//! Every key must be declared before use:
//!
//! ```rust
//! use prefstage::{MemoryPreferenceStore, OverlayPreferenceStore, PreferenceKey, PreferenceStore, PreferenceValue};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryPreferenceStore::with_defaults([
//!     ("editor.folding", PreferenceValue::Boolean(true)),
//! ]));
//! let mut overlay = OverlayPreferenceStore::new(store.clone(), [PreferenceKey::boolean("editor.folding")])?;
//!
//! overlay.set_value("editor.folding", false)?;
//! assert!(store.get_boolean("editor.folding"));   // not yet applied
//!
//! overlay.propagate()?;
//! assert!(!store.get_boolean("editor.folding"));
//! # Ok::<(), prefstage::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::events::{ListenerId, ListenerRegistry, PreferenceChangeEvent};
use crate::store::PreferenceStore;
use crate::value::{PreferenceKey, PreferenceType, PreferenceValue};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Staging layer over a shared preference store
pub struct OverlayPreferenceStore {
    parent: Arc<dyn PreferenceStore>,

    /// Declared keys, in declaration order
    keys: Vec<PreferenceKey>,

    /// Name → position in `keys`
    index: HashMap<String, usize>,

    /// Staged values, already fitted to their declared type
    staged: HashMap<String, PreferenceValue>,

    /// Staged names whose last edit was a reset to the default
    resets: HashSet<String>,

    listeners: ListenerRegistry,
}

impl OverlayPreferenceStore {
    /// Create an overlay managing `keys`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKeyType` if the same name is declared twice with different types.
    pub fn new(
        parent: Arc<dyn PreferenceStore>,
        keys: impl IntoIterator<Item = PreferenceKey>,
    ) -> Result<Self> {
        let mut overlay = Self {
            parent,
            keys: Vec::new(),
            index: HashMap::new(),
            staged: HashMap::new(),
            resets: HashSet::new(),
            listeners: ListenerRegistry::new(),
        };
        overlay.add_keys(keys)?;
        Ok(overlay)
    }

    /// Register more keys (union with the keys already declared)
    ///
    /// Re-declaring a name with its existing type is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKeyType` if a name is already declared with a different type.
    pub fn add_keys(&mut self, keys: impl IntoIterator<Item = PreferenceKey>) -> Result<()> {
        for key in keys {
            if let Some(&position) = self.index.get(key.name()) {
                let existing = &self.keys[position];
                if existing.preference_type() != key.preference_type() {
                    return Err(Error::InvalidKeyType {
                        key: key.name().to_string(),
                        declared: existing.preference_type(),
                        actual: key.preference_type(),
                    });
                }
                continue;
            }
            self.index.insert(key.name().to_string(), self.keys.len());
            self.keys.push(key);
        }
        Ok(())
    }

    /// Declared keys in declaration order
    pub fn keys(&self) -> &[PreferenceKey] {
        &self.keys
    }

    /// The declared key for `name`
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownKey` if `name` was never declared.
    pub fn key(&self, name: &str) -> Result<&PreferenceKey> {
        self.index
            .get(name)
            .map(|&position| &self.keys[position])
            .ok_or_else(|| Error::UnknownKey(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The underlying store
    pub fn parent(&self) -> &Arc<dyn PreferenceStore> {
        &self.parent
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Staged value if present, else the underlying store's effective value
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownKey` if `name` was never declared.
    pub fn get_value(&self, name: &str) -> Result<PreferenceValue> {
        let key = self.key(name)?;
        if let Some(value) = self.staged.get(name) {
            return Ok(value.clone());
        }
        Ok(self.live_value(key))
    }

    /// The underlying store's default for `name`
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownKey` if `name` was never declared.
    pub fn get_default(&self, name: &str) -> Result<PreferenceValue> {
        let key = self.key(name)?;
        Ok(self.live_default(key))
    }

    /// Whether the visible value of `name` equals its default
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownKey` if `name` was never declared.
    pub fn is_default(&self, name: &str) -> Result<bool> {
        Ok(self.get_value(name)? == self.get_default(name)?)
    }

    pub fn get_boolean(&self, name: &str) -> Result<bool> {
        match self.typed(name, PreferenceType::Boolean)? {
            PreferenceValue::Boolean(b) => Ok(b),
            other => Err(self.mismatch(name, other.preference_type())),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<String> {
        match self.typed(name, PreferenceType::String)? {
            PreferenceValue::String(s) => Ok(s),
            other => Err(self.mismatch(name, other.preference_type())),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i32> {
        match self.typed(name, PreferenceType::Int)? {
            PreferenceValue::Int(n) => Ok(n),
            other => Err(self.mismatch(name, other.preference_type())),
        }
    }

    pub fn get_long(&self, name: &str) -> Result<i64> {
        match self.typed(name, PreferenceType::Long)? {
            PreferenceValue::Long(n) => Ok(n),
            other => Err(self.mismatch(name, other.preference_type())),
        }
    }

    pub fn get_float(&self, name: &str) -> Result<f32> {
        match self.typed(name, PreferenceType::Float)? {
            PreferenceValue::Float(n) => Ok(n),
            other => Err(self.mismatch(name, other.preference_type())),
        }
    }

    pub fn get_double(&self, name: &str) -> Result<f64> {
        match self.typed(name, PreferenceType::Double)? {
            PreferenceValue::Double(n) => Ok(n),
            other => Err(self.mismatch(name, other.preference_type())),
        }
    }

    // =========================================================================
    // Writes (staging only)
    // =========================================================================

    /// Stage a value for `name`
    ///
    /// The underlying store is not touched. The value must match the
    /// declared type, allowing int → long and float → double widening.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownKey` for undeclared names and
    /// `Error::InvalidKeyType` for values of the wrong type.
    pub fn set_value(&mut self, name: &str, value: impl Into<PreferenceValue>) -> Result<()> {
        let declared = self.key(name)?.preference_type();
        let value = value.into().widen_to(name, declared)?;
        let old_value = self.get_value(name)?;

        debug!("Staging {name} = {value}");
        self.staged.insert(name.to_string(), value.clone());
        self.resets.remove(name);

        if old_value != value {
            self.listeners.notify(&PreferenceChangeEvent::new(
                name,
                Some(old_value),
                Some(value),
            ));
        }
        Ok(())
    }

    /// Stage the underlying store's default for `name`
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownKey` if `name` was never declared.
    pub fn set_to_default(&mut self, name: &str) -> Result<()> {
        let default = self.get_default(name)?;
        self.set_value(name, default)?;
        self.resets.insert(name.to_string());
        Ok(())
    }

    /// Stage the default for every declared key
    pub fn set_all_to_default(&mut self) {
        for position in 0..self.keys.len() {
            let key = self.keys[position].clone();
            let default = self.live_default(&key);
            // Declared name with a default of its own type: cannot fail
            if self.set_value(key.name(), default).is_ok() {
                self.resets.insert(key.name().to_string());
            }
        }
    }

    /// Whether `name` has a staged value
    pub fn is_staged(&self, name: &str) -> bool {
        self.staged.contains_key(name)
    }

    /// Names with a staged value, in declaration order
    pub fn staged_names(&self) -> Vec<&str> {
        self.keys
            .iter()
            .map(PreferenceKey::name)
            .filter(|name| self.staged.contains_key(*name))
            .collect()
    }

    /// Names whose staged value differs from the underlying store, in declaration order
    pub fn changed_names(&self) -> Vec<&str> {
        self.keys
            .iter()
            .filter(|key| {
                self.staged
                    .get(key.name())
                    .is_some_and(|staged| *staged != self.live_value(key))
            })
            .map(PreferenceKey::name)
            .collect()
    }

    /// Whether any staged value differs from the underlying store
    pub fn is_dirty(&self) -> bool {
        !self.changed_names().is_empty()
    }

    // =========================================================================
    // Commit / discard
    // =========================================================================

    /// Write every staged value into the underlying store, in declaration order
    ///
    /// Keys reset with [`set_to_default`](Self::set_to_default) are applied
    /// as `set_to_default` on the store; other staged values are written
    /// with `set`, skipping values the store already holds. Staged values
    /// are kept, so a failed propagation can simply be retried.
    ///
    /// Returns the number of keys written.
    ///
    /// # Errors
    ///
    /// Returns `Error::PersistenceFailure` naming the first key the
    /// underlying store refused. Keys before it have been applied.
    pub fn propagate(&self) -> Result<usize> {
        let mut written = 0;
        for key in &self.keys {
            let name = key.name();
            let Some(staged) = self.staged.get(name) else {
                continue;
            };

            let result = if self.resets.contains(name) {
                if self.parent.is_default(name) {
                    continue;
                }
                self.parent.set_to_default(name)
            } else if *staged == self.live_value(key) {
                continue;
            } else {
                self.parent.set(name, staged.clone())
            };

            result.map_err(|e| {
                if e.is_key_error() {
                    e
                } else {
                    Error::PersistenceFailure {
                        key: name.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;
            written += 1;
        }
        debug!("Propagated {written} staged preference(s)");
        Ok(written)
    }

    /// Discard every staged value so the overlay shows the live store again
    pub fn load(&mut self) {
        let staged = std::mem::take(&mut self.staged);
        self.resets.clear();
        for key in &self.keys {
            if let Some(old_value) = staged.get(key.name()) {
                let new_value = self.live_value(key);
                if *old_value != new_value {
                    self.listeners.notify(&PreferenceChangeEvent::new(
                        key.name(),
                        Some(old_value.clone()),
                        Some(new_value),
                    ));
                }
            }
        }
        debug!("Discarded {} staged preference(s)", staged.len());
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a listener for changes of visible overlay values
    pub fn on_change<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&PreferenceChangeEvent) + Send + Sync + 'static,
    {
        self.listeners.on_change(callback)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn live_value(&self, key: &PreferenceKey) -> PreferenceValue {
        self.parent
            .value(key.name())
            .and_then(|v| v.coerce(key.preference_type()))
            .unwrap_or_else(|| self.live_default(key))
    }

    fn live_default(&self, key: &PreferenceKey) -> PreferenceValue {
        self.parent
            .get_default(key.name())
            .and_then(|v| v.coerce(key.preference_type()))
            .unwrap_or_else(|| key.preference_type().zero_value())
    }

    fn typed(&self, name: &str, requested: PreferenceType) -> Result<PreferenceValue> {
        let declared = self.key(name)?.preference_type();
        if declared != requested {
            return Err(Error::InvalidKeyType {
                key: name.to_string(),
                declared,
                actual: requested,
            });
        }
        self.get_value(name)
    }

    fn mismatch(&self, name: &str, actual: PreferenceType) -> Error {
        let declared = self
            .key(name)
            .map_or(actual, PreferenceKey::preference_type);
        Error::InvalidKeyType {
            key: name.to_string(),
            declared,
            actual,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
