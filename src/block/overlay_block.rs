//! A configuration block whose controls edit an overlay store
//!
//! ```rust
//! use prefstage::{ConfigurationBlock, MemoryPreferenceStore, OverlayBlockBuilder, PreferenceKey, PreferenceStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryPreferenceStore::new());
//! let mut block = OverlayBlockBuilder::new("Mark Occurrences", store.clone())
//!     .keys([PreferenceKey::boolean("mark"), PreferenceKey::boolean("sticky")])
//!     .checkbox("Mark occurrences", "mark")
//!     .checkbox("Keep marks", "sticky")
//!     .depends_on("sticky", "mark")
//!     .build()?;
//!
//! block.create_control()?;
//! block.initialize()?;
//! assert!(!block.form().get("sticky").unwrap().is_enabled());
//!
//! block.select("mark", true)?;
//! assert!(block.form().get("sticky").unwrap().is_enabled());
//! assert!(!store.get_boolean("mark"));
//!
//! assert!(block.perform_ok());
//! assert!(store.get_boolean("mark"));
//! # Ok::<(), prefstage::Error>(())
//! ```

use super::controls::{CheckBox, Control, Form, TextField};
use super::dependency::DependencyGraph;
use super::{BlockState, ConfigurationBlock, Lifecycle};
use crate::config::PreferenceKeys;
use crate::error::{Error, Result};
use crate::events::{ListenerId, PreferenceChangeEvent};
use crate::overlay::OverlayPreferenceStore;
use crate::snapshot::SettingsSnapshot;
use crate::status::{Status, StatusListener};
use crate::store::PreferenceStore;
use crate::validation::FieldValidator;
use crate::value::{PreferenceKey, PreferenceValue};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// Builder
// =============================================================================

enum ControlSpec {
    CheckBox {
        label: String,
        name: String,
    },
    TextField {
        label: String,
        name: String,
        validator: Option<FieldValidator>,
    },
}

/// Builder for [`OverlayConfigurationBlock`]
///
/// Every control must be bound to a declared key. Declaration and binding
/// errors are reported by [`build`](Self::build).
pub struct OverlayBlockBuilder {
    name: String,
    store: Arc<dyn PreferenceStore>,
    keys: Vec<PreferenceKey>,
    defaults: Vec<(PreferenceKey, PreferenceValue)>,
    controls: Vec<ControlSpec>,
    edges: Vec<(String, String)>,
    status_listener: Option<Box<dyn StatusListener>>,
}

impl OverlayBlockBuilder {
    /// Start a block named `name` editing `store`
    pub fn new(name: impl Into<String>, store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            name: name.into(),
            store,
            keys: Vec::new(),
            defaults: Vec::new(),
            controls: Vec::new(),
            edges: Vec::new(),
            status_listener: None,
        }
    }

    /// Declare keys without registering defaults
    #[must_use]
    pub fn keys(mut self, keys: impl IntoIterator<Item = PreferenceKey>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Declare the keys of `T` and register its defaults in the store
    #[must_use]
    pub fn with_keys<T: PreferenceKeys>(mut self) -> Self {
        self.defaults.extend(T::default_values());
        self
    }

    /// Add a check box bound to the boolean key `name`
    #[must_use]
    pub fn checkbox(mut self, label: impl Into<String>, name: impl Into<String>) -> Self {
        self.controls.push(ControlSpec::CheckBox {
            label: label.into(),
            name: name.into(),
        });
        self
    }

    /// Add a text field bound to the non-boolean key `name`
    #[must_use]
    pub fn text_field(
        mut self,
        label: impl Into<String>,
        name: impl Into<String>,
        validator: Option<FieldValidator>,
    ) -> Self {
        self.controls.push(ControlSpec::TextField {
            label: label.into(),
            name: name.into(),
            validator,
        });
        self
    }

    /// Enable `slave` only while the check box `master` is selected
    #[must_use]
    pub fn depends_on(mut self, slave: impl Into<String>, master: impl Into<String>) -> Self {
        self.edges.push((slave.into(), master.into()));
        self
    }

    /// Receive every status change of the block
    #[must_use]
    pub fn with_status_listener(mut self, listener: impl StatusListener + 'static) -> Self {
        self.status_listener = Some(Box::new(listener));
        self
    }

    /// Build the block
    ///
    /// # Errors
    ///
    /// - `Error::InvalidKeyType` if a key is declared twice with different
    ///   types, a check box is bound to a non-boolean key, a text field to a
    ///   boolean key, or a master is not a check box
    /// - `Error::UnknownKey` if a control or dependency names an undeclared key
    /// - `Error::Config` if two controls are bound to the same key
    pub fn build(self) -> Result<OverlayConfigurationBlock> {
        for (key, value) in &self.defaults {
            self.store.set_default(key.name(), value.clone());
        }

        let declared = self
            .keys
            .into_iter()
            .chain(self.defaults.into_iter().map(|(key, _)| key));
        let overlay = OverlayPreferenceStore::new(self.store, declared)?;

        let mut form = Form::new();
        for spec in self.controls {
            let control = match spec {
                ControlSpec::CheckBox { label, name } => {
                    Control::CheckBox(CheckBox::new(label, overlay.key(&name)?.clone())?)
                }
                ControlSpec::TextField {
                    label,
                    name,
                    validator,
                } => Control::TextField(TextField::new(
                    label,
                    overlay.key(&name)?.clone(),
                    validator,
                )?),
            };
            form.add(control)?;
        }

        let mut dependencies = DependencyGraph::new();
        for (slave, master) in self.edges {
            form.checkbox(&master)?;
            if form.get(&slave).is_none() {
                return Err(Error::UnknownKey(slave));
            }
            dependencies.add(slave, master);
        }

        debug!(
            "Built block '{}' with {} control(s) over {} key(s)",
            self.name,
            form.len(),
            overlay.keys().len()
        );

        Ok(OverlayConfigurationBlock {
            name: self.name,
            overlay,
            form,
            dependencies,
            lifecycle: Lifecycle::new(),
            commit_status: Status::ok(),
            reported_status: Status::ok(),
            status_listener: self.status_listener,
            store_listener: None,
            external_change: Arc::new(AtomicBool::new(false)),
        })
    }
}

// =============================================================================
// Block
// =============================================================================

/// Key-bound check boxes and text fields over an [`OverlayPreferenceStore`]
pub struct OverlayConfigurationBlock {
    name: String,
    overlay: OverlayPreferenceStore,
    form: Form,
    dependencies: DependencyGraph,
    lifecycle: Lifecycle,

    /// Outcome of the last commit
    commit_status: Status,

    /// Last status sent to the listener
    reported_status: Status,
    status_listener: Option<Box<dyn StatusListener>>,

    /// Listener registered on the shared store while realized
    store_listener: Option<ListenerId>,

    /// Set by the store listener when the shared store changes
    external_change: Arc<AtomicBool>,
}

impl OverlayConfigurationBlock {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn overlay(&self) -> &OverlayPreferenceStore {
        &self.overlay
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn dependencies(&self) -> &DependencyGraph {
        &self.dependencies
    }

    /// Select or clear the check box bound to `name`
    ///
    /// The value is staged in the overlay and every slave of the check box
    /// is re-enabled or disabled.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the block is active, and
    /// `Error::UnknownKey` / `Error::InvalidKeyType` if `name` is not bound to
    /// a check box.
    pub fn select(&mut self, name: &str, selected: bool) -> Result<()> {
        self.lifecycle.ensure_active("edit")?;
        self.form.checkbox_mut(name)?.set_selected(selected);
        self.overlay.set_value(name, selected)?;
        self.dependencies.apply(&mut self.form, name);
        self.report_status();
        Ok(())
    }

    /// Type into the text field bound to `name`
    ///
    /// Valid text is staged in the overlay. Invalid text stays in the field
    /// and is returned as an ERROR status; the overlay keeps its previous
    /// value.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the block is active, and
    /// `Error::UnknownKey` / `Error::InvalidKeyType` if `name` is not bound to
    /// a text field.
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<Status> {
        self.lifecycle.ensure_active("edit")?;
        let field = self.form.text_field_mut(name)?;
        let staged = field.set_text(text);
        let status = field.status().clone();
        if let Some(value) = staged {
            self.overlay.set_value(name, value)?;
        }
        self.report_status();
        Ok(status)
    }

    /// Whether the shared store changed since the controls were last refreshed
    pub fn has_external_changes(&self) -> bool {
        self.external_change.load(Ordering::SeqCst)
    }

    /// Refresh controls whose key has no staged edit from the shared store
    ///
    /// Returns `false` if nothing changed since the last refresh.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the block is active.
    pub fn sync_external_changes(&mut self) -> Result<bool> {
        self.lifecycle.ensure_active("refresh")?;
        if !self.external_change.swap(false, Ordering::SeqCst) {
            return Ok(false);
        }
        for control in self.form.iter_mut() {
            if self.overlay.is_staged(control.key().name()) {
                continue;
            }
            let value = self.overlay.get_value(control.key().name())?;
            control.show(&value);
        }
        self.dependencies.apply_all(&mut self.form);
        self.report_status();
        Ok(true)
    }

    fn refresh_controls(&mut self) -> Result<()> {
        for control in self.form.iter_mut() {
            let value = self.overlay.get_value(control.key().name())?;
            control.show(&value);
        }
        self.dependencies.apply_all(&mut self.form);
        self.external_change.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn report_status(&mut self) {
        let status = self.status();
        if status != self.reported_status {
            if let Some(listener) = self.status_listener.as_mut() {
                listener.status_changed(&status);
            }
            self.reported_status = status;
        }
    }

    fn commit(&mut self) -> Result<usize> {
        let written = self.overlay.propagate()?;
        self.overlay.parent().save()?;
        Ok(written)
    }
}

impl ConfigurationBlock for OverlayConfigurationBlock {
    fn create_control(&mut self) -> Result<()> {
        self.lifecycle.realize()?;
        let flag = self.external_change.clone();
        let id = self
            .overlay
            .parent()
            .on_change(Arc::new(move |_event: &PreferenceChangeEvent| {
                flag.store(true, Ordering::SeqCst);
            }));
        self.store_listener = Some(id);
        debug!("Created {} control(s) for '{}'", self.form.len(), self.name);
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        self.lifecycle.activate()?;
        self.refresh_controls()?;
        self.report_status();
        Ok(())
    }

    fn perform_ok(&mut self) -> bool {
        if let Err(e) = self.lifecycle.begin_apply() {
            warn!("'{}': {e}", self.name);
            return false;
        }
        let result = self.commit();
        self.lifecycle.finish();
        // Our own writes also reach the store listener
        self.external_change.store(false, Ordering::SeqCst);

        let applied = match result {
            Ok(written) => {
                info!("'{}': applied {written} preference change(s)", self.name);
                self.commit_status = Status::ok();
                true
            }
            Err(e) => {
                error!("'{}': failed to apply preferences: {e}", self.name);
                self.commit_status = Status::warning(format!("Settings could not be saved: {e}"));
                false
            }
        };
        self.report_status();
        applied
    }

    fn perform_defaults(&mut self) -> Result<()> {
        self.lifecycle.begin_discard("restore defaults of")?;
        self.overlay.set_all_to_default();
        let result = self.refresh_controls();
        self.lifecycle.finish();
        self.report_status();
        result
    }

    fn perform_cancel(&mut self) -> Result<()> {
        self.lifecycle.begin_discard("cancel edits of")?;
        self.overlay.load();
        self.commit_status = Status::ok();
        let result = self.refresh_controls();
        self.lifecycle.finish();
        self.report_status();
        result
    }

    fn dispose(&mut self) {
        if !self.lifecycle.dispose() {
            return;
        }
        if let Some(id) = self.store_listener.take() {
            self.overlay.parent().remove_listener(id);
        }
        debug!("Disposed block '{}'", self.name);
    }

    fn state(&self) -> BlockState {
        self.lifecycle.state()
    }

    fn status(&self) -> Status {
        Status::most_severe([&self.form.status(), &self.commit_status])
    }

    fn current_settings(&self) -> Option<SettingsSnapshot> {
        let entries = self
            .overlay
            .keys()
            .iter()
            .filter_map(|key| {
                self.overlay
                    .get_value(key.name())
                    .ok()
                    .map(|value| (key.name(), value))
            });
        Some(SettingsSnapshot::from_entries(entries))
    }
}

impl Drop for OverlayConfigurationBlock {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPreferenceStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> Arc<MemoryPreferenceStore> {
        Arc::new(MemoryPreferenceStore::with_defaults([
            ("occurrences.mark", PreferenceValue::Boolean(true)),
            ("occurrences.sticky", PreferenceValue::Boolean(false)),
            ("occurrences.delay", PreferenceValue::Int(500)),
        ]))
    }

    fn block(store: Arc<MemoryPreferenceStore>) -> OverlayConfigurationBlock {
        OverlayBlockBuilder::new("Occurrences", store)
            .keys([
                PreferenceKey::boolean("occurrences.mark"),
                PreferenceKey::boolean("occurrences.sticky"),
                PreferenceKey::int("occurrences.delay"),
            ])
            .checkbox("Mark occurrences", "occurrences.mark")
            .checkbox("Keep marks", "occurrences.sticky")
            .text_field(
                "Delay",
                "occurrences.delay",
                Some(FieldValidator::new("Delay").int_range(0, 10_000)),
            )
            .depends_on("occurrences.sticky", "occurrences.mark")
            .depends_on("occurrences.delay", "occurrences.mark")
            .build()
            .unwrap()
    }

    fn active(store: Arc<MemoryPreferenceStore>) -> OverlayConfigurationBlock {
        let mut block = block(store);
        block.create_control().unwrap();
        block.initialize().unwrap();
        block
    }

    #[test]
    fn test_build_rejects_bad_bindings() {
        let store = store();
        let unknown = OverlayBlockBuilder::new("x", store.clone())
            .checkbox("Missing", "missing")
            .build();
        assert!(matches!(unknown, Err(Error::UnknownKey(_))));

        let wrong_type = OverlayBlockBuilder::new("x", store.clone())
            .keys([PreferenceKey::int("occurrences.delay")])
            .checkbox("Delay", "occurrences.delay")
            .build();
        assert!(matches!(wrong_type, Err(Error::InvalidKeyType { .. })));

        let text_master = OverlayBlockBuilder::new("x", store)
            .keys([
                PreferenceKey::int("occurrences.delay"),
                PreferenceKey::boolean("occurrences.mark"),
            ])
            .checkbox("Mark", "occurrences.mark")
            .text_field("Delay", "occurrences.delay", None)
            .depends_on("occurrences.mark", "occurrences.delay")
            .build();
        assert!(matches!(text_master, Err(Error::InvalidKeyType { .. })));
    }

    #[test]
    fn test_initialize_loads_controls() {
        let store = store();
        store
            .set("occurrences.delay", PreferenceValue::Int(750))
            .unwrap();
        let block = active(store);

        assert!(block.form().checkbox("occurrences.mark").unwrap().is_selected());
        assert_eq!(
            block.form().text_field("occurrences.delay").unwrap().text(),
            "750"
        );
        assert!(block.form().get("occurrences.sticky").unwrap().is_enabled());
    }

    #[test]
    fn test_edits_require_active_block() {
        let mut block = block(store());
        assert!(matches!(
            block.select("occurrences.mark", false),
            Err(Error::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_invalid_text_is_not_staged() {
        let store = store();
        let mut block = active(store.clone());

        let status = block.set_text("occurrences.delay", "fast").unwrap();
        assert!(status.is_error());
        assert!(block.status().is_error());
        assert_eq!(block.overlay().get_int("occurrences.delay").unwrap(), 500);

        let status = block.set_text("occurrences.delay", "100").unwrap();
        assert!(status.is_ok());
        assert!(block.status().is_ok());
        assert_eq!(block.overlay().get_int("occurrences.delay").unwrap(), 100);
        assert_eq!(store.get_int("occurrences.delay"), 500);
    }

    #[test]
    fn test_cancel_discards_edits() {
        let store = store();
        let mut block = active(store.clone());
        block.select("occurrences.mark", false).unwrap();
        assert!(!block.form().get("occurrences.sticky").unwrap().is_enabled());

        block.perform_cancel().unwrap();
        assert!(block.form().checkbox("occurrences.mark").unwrap().is_selected());
        assert!(block.form().get("occurrences.sticky").unwrap().is_enabled());
        assert!(!block.overlay().is_dirty());
        assert!(store.names().is_empty());
    }

    #[test]
    fn test_defaults_then_ok_resets_store() {
        let store = store();
        store
            .set("occurrences.delay", PreferenceValue::Int(42))
            .unwrap();
        let mut block = active(store.clone());

        block.perform_defaults().unwrap();
        assert_eq!(
            block.form().text_field("occurrences.delay").unwrap().text(),
            "500"
        );
        assert_eq!(store.get_int("occurrences.delay"), 42);

        assert!(block.perform_ok());
        assert!(store.is_default("occurrences.delay"));
    }

    #[test]
    fn test_status_listener_sees_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut block = OverlayBlockBuilder::new("Occurrences", store())
            .keys([PreferenceKey::int("occurrences.delay")])
            .text_field("Delay", "occurrences.delay", None)
            .with_status_listener(move |status: &Status| {
                sink.borrow_mut().push(status.severity);
            })
            .build()
            .unwrap();
        block.create_control().unwrap();
        block.initialize().unwrap();

        block.set_text("occurrences.delay", "x").unwrap();
        // Same status again: not reported
        block.set_text("occurrences.delay", "x").unwrap();
        block.set_text("occurrences.delay", "1").unwrap();

        use crate::status::Severity;
        assert_eq!(*seen.borrow(), [Severity::Error, Severity::Ok]);
    }

    #[test]
    fn test_external_changes_refresh_unstaged_controls() {
        let store = store();
        let mut block = active(store.clone());
        block.set_text("occurrences.delay", "900").unwrap();

        store
            .set("occurrences.mark", PreferenceValue::Boolean(false))
            .unwrap();
        store
            .set("occurrences.delay", PreferenceValue::Int(1))
            .unwrap();
        assert!(block.has_external_changes());

        assert!(block.sync_external_changes().unwrap());
        assert!(!block.form().checkbox("occurrences.mark").unwrap().is_selected());
        assert_eq!(
            block.form().text_field("occurrences.delay").unwrap().text(),
            "900"
        );
        assert!(!block.sync_external_changes().unwrap());
    }

    #[test]
    fn test_dispose_releases_store_listener_once() {
        let store = store();
        let mut block = active(store.clone());
        assert_eq!(store.listener_count(), 1);

        block.dispose();
        block.dispose();
        assert_eq!(store.listener_count(), 0);
        assert_eq!(block.state(), BlockState::Disposed);
    }
}
