//! Path variables block
//!
//! Edits a list of named path variables (`JRE_LIB → /usr/lib/jvm/...`)
//! stored directly in a preference store, one entry per variable under a
//! common prefix. Edits go to a working copy; `perform_ok` writes the
//! difference back.

use super::{BlockState, ConfigurationBlock, Lifecycle};
use crate::error::Result;
use crate::snapshot::SettingsSnapshot;
use crate::status::{Status, StatusListener};
use crate::store::PreferenceStore;
use crate::validation::FieldValidator;
use crate::value::PreferenceValue;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_PREFIX: &str = "variable.";
const NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_.\-]*$";

/// Block editing named path variables
pub struct VariablesBlock {
    store: Arc<dyn PreferenceStore>,
    prefix: String,
    name_validator: FieldValidator,
    path_validator: FieldValidator,

    /// Variables as last read from or written to the store
    persisted: BTreeMap<String, String>,

    /// Variables as currently edited
    working: BTreeMap<String, String>,

    lifecycle: Lifecycle,
    status: Status,
    status_listener: Option<Box<dyn StatusListener>>,
}

impl VariablesBlock {
    /// Create a block over `store` using the `variable.` prefix
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if the name pattern fails to compile.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Result<Self> {
        Self::with_prefix(store, DEFAULT_PREFIX)
    }

    /// Create a block storing variables under `prefix`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if the name pattern fails to compile.
    pub fn with_prefix(store: Arc<dyn PreferenceStore>, prefix: impl Into<String>) -> Result<Self> {
        let name_validator = FieldValidator::new("Variable name").non_empty().pattern(
            NAME_PATTERN,
            "Variable names start with a letter or '_' and contain no spaces or '/'",
        )?;
        Ok(Self {
            store,
            prefix: prefix.into(),
            name_validator,
            path_validator: FieldValidator::new("Path").non_empty(),
            persisted: BTreeMap::new(),
            working: BTreeMap::new(),
            lifecycle: Lifecycle::new(),
            status: Status::ok(),
            status_listener: None,
        })
    }

    pub fn set_status_listener(&mut self, listener: impl StatusListener + 'static) {
        self.status_listener = Some(Box::new(listener));
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Add or change a variable in the working copy
    ///
    /// Invalid names or empty paths leave the working copy unchanged and are
    /// reported as an ERROR status.
    pub fn set_variable(&mut self, name: &str, path: &str) -> Status {
        let status = Status::most_severe([
            &self.name_validator.validate(name),
            &self.path_validator.validate(path),
        ]);
        if status.is_ok() {
            debug!("Variable {name} = {path}");
            self.working.insert(name.to_string(), path.to_string());
        }
        self.update_status(status.clone());
        status
    }

    /// Remove a variable from the working copy; returns `false` if absent
    pub fn remove_variable(&mut self, name: &str) -> bool {
        self.working.remove(name).is_some()
    }

    /// The working copy, sorted by name
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.working
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.working.get(name).map(String::as_str)
    }

    /// Whether the working copy differs from the store
    pub fn is_modified(&self) -> bool {
        self.working != self.persisted
    }

    fn storage_key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    fn read_store(&self) -> BTreeMap<String, String> {
        self.store
            .names()
            .into_iter()
            .filter_map(|key| {
                let name = key.strip_prefix(&self.prefix)?.to_string();
                let path = self.store.get_string(&key);
                Some((name, path))
            })
            .collect()
    }

    fn load(&mut self) {
        self.persisted = self.read_store();
        self.working = self.persisted.clone();
    }

    fn write_back(&self) -> Result<usize> {
        let mut written = 0;
        for name in self.persisted.keys() {
            if !self.working.contains_key(name) {
                self.store.set_to_default(&self.storage_key(name))?;
                written += 1;
            }
        }
        for (name, path) in &self.working {
            if self.persisted.get(name) != Some(path) {
                self.store
                    .set(&self.storage_key(name), PreferenceValue::from(path.as_str()))?;
                written += 1;
            }
        }
        self.store.save()?;
        Ok(written)
    }

    fn update_status(&mut self, status: Status) {
        if status != self.status {
            if let Some(listener) = self.status_listener.as_mut() {
                listener.status_changed(&status);
            }
            self.status = status;
        }
    }
}

impl ConfigurationBlock for VariablesBlock {
    fn create_control(&mut self) -> Result<()> {
        self.lifecycle.realize()
    }

    fn initialize(&mut self) -> Result<()> {
        self.lifecycle.activate()?;
        self.load();
        debug!("Loaded {} variable(s)", self.working.len());
        Ok(())
    }

    fn perform_ok(&mut self) -> bool {
        if let Err(e) = self.lifecycle.begin_apply() {
            warn!("Variables: {e}");
            return false;
        }
        let result = self.write_back();
        self.lifecycle.finish();

        match result {
            Ok(written) => {
                info!("Saved {written} variable change(s)");
                self.persisted = self.working.clone();
                self.update_status(Status::ok());
                true
            }
            Err(e) => {
                error!("Failed to save variables: {e}");
                // Entries written before the failure are now in the store
                self.persisted = self.read_store();
                self.update_status(Status::warning(format!("Variables could not be saved: {e}")));
                false
            }
        }
    }

    fn perform_defaults(&mut self) -> Result<()> {
        self.lifecycle.begin_discard("restore defaults of")?;
        self.working.clear();
        self.lifecycle.finish();
        self.update_status(Status::ok());
        Ok(())
    }

    fn perform_cancel(&mut self) -> Result<()> {
        self.lifecycle.begin_discard("cancel edits of")?;
        self.working = self.persisted.clone();
        self.lifecycle.finish();
        self.update_status(Status::ok());
        Ok(())
    }

    fn dispose(&mut self) {
        self.lifecycle.dispose();
    }

    fn state(&self) -> BlockState {
        self.lifecycle.state()
    }

    fn status(&self) -> Status {
        self.status.clone()
    }

    fn current_settings(&self) -> Option<SettingsSnapshot> {
        Some(SettingsSnapshot::from_entries(
            self.working
                .iter()
                .map(|(name, path)| (name.as_str(), PreferenceValue::from(path.as_str()))),
        ))
    }
}
