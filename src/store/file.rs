//! File-backed preference store
//!
//! Only values that differ from their defaults are written, as a flat
//! `name → string` map. Changing a default in code therefore reaches every
//! user who never customized that preference.

use super::{MemoryPreferenceStore, PreferenceStore};
use crate::config::{EnvSource, PreferencesConfig};
use crate::error::Result;
use crate::events::{ChangeCallback, ListenerId};
use crate::storage::{JsonStorage, StorageBackend};
use crate::value::PreferenceValue;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Looks up environment overrides for preference names
struct EnvironmentHandler {
    prefix: Option<String>,
    source: Arc<dyn EnvSource>,
}

impl EnvironmentHandler {
    /// Format: {PREFIX}_{NAME} (all uppercase, `.` and `-` become `_`)
    fn var_name(&self, name: &str) -> Option<String> {
        self.prefix.as_ref().map(|prefix| {
            let env_key = name.replace(['.', '-'], "_").to_uppercase();
            format!("{}_{}", prefix.to_uppercase(), env_key)
        })
    }

    fn override_for(&self, name: &str) -> Option<PreferenceValue> {
        let var_name = self.var_name(name)?;
        self.source.var(&var_name).map(PreferenceValue::String)
    }
}

/// Preference store persisted to a single file
pub struct FilePreferenceStore<S: StorageBackend = JsonStorage> {
    path: PathBuf,
    storage: S,
    inner: MemoryPreferenceStore,
    env: EnvironmentHandler,
}

impl<S: StorageBackend> FilePreferenceStore<S> {
    /// Open the store described by `config`, loading the file if it exists
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(config: PreferencesConfig<S>) -> Result<Self> {
        let path = config.preferences_path();
        let store = Self {
            path,
            storage: config.storage,
            inner: MemoryPreferenceStore::new(),
            env: EnvironmentHandler {
                prefix: config.env_prefix,
                source: config.env_source,
            },
        };
        store.reload()?;
        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the backing file, discarding unsaved explicit values
    ///
    /// Listeners are notified for every preference whose effective value
    /// changed. A missing file means "no explicit values".
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn reload(&self) -> Result<()> {
        let entries: BTreeMap<String, String> = if self.path.exists() {
            self.storage.read(&self.path)?
        } else {
            debug!("No preference file at {}, starting empty", self.path.display());
            BTreeMap::new()
        };
        info!(
            "Loaded {} preference(s) from {}",
            entries.len(),
            self.path.display()
        );
        self.inner.replace_entries(entries);
        Ok(())
    }

    /// Environment variable consulted for `name`, if overrides are enabled
    pub fn env_var_name(&self, name: &str) -> Option<String> {
        self.env.var_name(name)
    }

    /// Whether `name` is currently overridden by the environment
    pub fn is_env_override(&self, name: &str) -> bool {
        self.env.override_for(name).is_some()
    }
}

impl<S: StorageBackend> PreferenceStore for FilePreferenceStore<S> {
    fn get(&self, name: &str) -> Option<PreferenceValue> {
        if let Some(value) = self.env.override_for(name) {
            return match self.inner.get_default(name) {
                Some(default) => value.coerce(default.preference_type()),
                None => Some(value),
            };
        }
        self.inner.get(name)
    }

    fn get_default(&self, name: &str) -> Option<PreferenceValue> {
        self.inner.get_default(name)
    }

    fn is_default(&self, name: &str) -> bool {
        !self.is_env_override(name) && self.inner.is_default(name)
    }

    fn set(&self, name: &str, value: PreferenceValue) -> Result<()> {
        self.inner.set(name, value)
    }

    fn set_default(&self, name: &str, value: PreferenceValue) {
        self.inner.set_default(name, value);
    }

    fn set_to_default(&self, name: &str) -> Result<()> {
        self.inner.set_to_default(name)
    }

    fn names(&self) -> Vec<String> {
        self.inner.names()
    }

    fn save(&self) -> Result<()> {
        if !self.inner.needs_saving() {
            debug!("Preferences unchanged, skipping write to {}", self.path.display());
            return Ok(());
        }
        let entries = self.inner.entries();
        self.storage.write(&self.path, &entries)?;
        self.inner.mark_saved();
        info!(
            "Saved {} preference(s) to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn needs_saving(&self) -> bool {
        self.inner.needs_saving()
    }

    fn on_change(&self, callback: ChangeCallback) -> ListenerId {
        self.inner.on_change(callback)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.remove_listener(id)
    }
}

// =============================================================================
// Tests
// =============================================================================
