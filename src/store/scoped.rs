//! Project scope layered over a workspace scope
//!
//! Property pages edit project-specific settings. A project inherits every
//! preference it does not set itself from the workspace, so from the
//! project's point of view the workspace's effective value *is* the
//! default: restoring defaults on a property page means "inherit again".
//! Once a project holds its own value, editing it never falls back to
//! inheriting; only `set_to_default` and
//! [`set_project_specific(.., false)`](ScopedPreferenceStore::set_project_specific) do.

use super::PreferenceStore;
use crate::error::Result;
use crate::events::{ChangeCallback, ListenerId, PreferenceChangeEvent};
use crate::sync::RwLockExt;
use crate::value::{PreferenceKey, PreferenceValue};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A project store that falls back to a workspace store
pub struct ScopedPreferenceStore {
    project: Arc<dyn PreferenceStore>,
    workspace: Arc<dyn PreferenceStore>,

    /// Project listener id → the workspace listener registered with it
    workspace_listeners: RwLock<HashMap<ListenerId, ListenerId>>,
}

impl ScopedPreferenceStore {
    pub fn new(project: Arc<dyn PreferenceStore>, workspace: Arc<dyn PreferenceStore>) -> Self {
        Self {
            project,
            workspace,
            workspace_listeners: RwLock::new(HashMap::new()),
        }
    }

    pub fn project(&self) -> &Arc<dyn PreferenceStore> {
        &self.project
    }

    pub fn workspace(&self) -> &Arc<dyn PreferenceStore> {
        &self.workspace
    }

    /// Whether the project overrides any of `keys`
    pub fn has_project_specific(&self, keys: &[PreferenceKey]) -> bool {
        keys.iter().any(|key| self.project.get(key.name()).is_some())
    }

    /// Turn project-specific settings for `keys` on or off
    ///
    /// Enabling copies the currently inherited values into the project so
    /// the page starts from what the user saw. Disabling removes the
    /// project's values, returning every key to the workspace value.
    ///
    /// # Errors
    ///
    /// Returns any error from the project store.
    pub fn set_project_specific(&self, keys: &[PreferenceKey], enabled: bool) -> Result<()> {
        for key in keys {
            if enabled {
                if self.project.get(key.name()).is_none() {
                    if let Some(inherited) = self.workspace.value(key.name()) {
                        self.project.set(key.name(), inherited)?;
                    }
                }
            } else {
                self.project.set_to_default(key.name())?;
            }
        }
        info!(
            "Project specific settings {} for {} key(s)",
            if enabled { "enabled" } else { "disabled" },
            keys.len()
        );
        Ok(())
    }
}

impl PreferenceStore for ScopedPreferenceStore {
    fn get(&self, name: &str) -> Option<PreferenceValue> {
        self.project.get(name)
    }

    fn get_default(&self, name: &str) -> Option<PreferenceValue> {
        self.workspace.value(name)
    }

    fn set(&self, name: &str, value: PreferenceValue) -> Result<()> {
        self.project.set(name, value)
    }

    fn set_default(&self, name: &str, value: PreferenceValue) {
        self.workspace.set_default(name, value);
    }

    fn set_to_default(&self, name: &str) -> Result<()> {
        self.project.set_to_default(name)
    }

    fn is_default(&self, name: &str) -> bool {
        self.project.is_default(name)
    }

    fn names(&self) -> Vec<String> {
        self.project.names()
    }

    fn save(&self) -> Result<()> {
        self.project.save()
    }

    fn needs_saving(&self) -> bool {
        self.project.needs_saving()
    }

    /// Listen to project changes and to workspace changes of inherited names
    fn on_change(&self, callback: ChangeCallback) -> ListenerId {
        let project = self.project.clone();
        let forward = callback.clone();
        let workspace_id = self.workspace.on_change(Arc::new(move |event: &PreferenceChangeEvent| {
            if project.is_default(&event.name) {
                forward(event);
            }
        }));
        let id = self.project.on_change(callback);
        self.workspace_listeners
            .write_recovered()
            .insert(id, workspace_id);
        debug!("Registered scoped listener {id:?}");
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        if let Some(workspace_id) = self.workspace_listeners.write_recovered().remove(&id) {
            self.workspace.remove_listener(workspace_id);
        }
        self.project.remove_listener(id)
    }
}
