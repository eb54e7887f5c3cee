//! Settings page host
//!
//! A [`SettingsPage`] owns one configuration block and drives it on behalf
//! of a dialog: it opens the block, gates OK on the block's status, and
//! uses snapshots to decide whether closing should prompt for a save.
//!
//! ```rust
//! use prefstage::{MemoryPreferenceStore, PreferenceStore, SettingsPage, VariablesBlock};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryPreferenceStore::new());
//! store.set("variable.FOO", "/a".into())?;
//!
//! let mut page = SettingsPage::new("Classpath Variables", VariablesBlock::new(store.clone())?);
//! page.open()?;
//! page.block_mut().set_variable("FOO", "/b");
//! assert!(page.needs_save_prompt());
//!
//! assert!(page.perform_ok());
//! assert!(!page.close());
//! assert_eq!(store.get_string("variable.FOO"), "/b");
//! # Ok::<(), prefstage::Error>(())
//! ```

use crate::block::{BlockState, ConfigurationBlock};
use crate::error::{Error, Result};
use crate::snapshot::SettingsSnapshot;
use crate::status::Status;
use log::{debug, info, warn};

/// Host for a single configuration block
pub struct SettingsPage<B: ConfigurationBlock> {
    title: String,
    block: B,

    /// Block settings when the page was opened or last applied
    baseline: Option<SettingsSnapshot>,
}

impl<B: ConfigurationBlock> SettingsPage<B> {
    pub fn new(title: impl Into<String>, block: B) -> Self {
        Self {
            title: title.into(),
            block,
            baseline: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn block(&self) -> &B {
        &self.block
    }

    pub fn block_mut(&mut self) -> &mut B {
        &mut self.block
    }

    /// Bring the block to the Active state and record its settings
    ///
    /// Opening an already active page only refreshes the baseline.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` if the block was disposed, or any
    /// error from the block's `create_control` / `initialize`.
    pub fn open(&mut self) -> Result<()> {
        if self.block.state() == BlockState::Unrealized {
            self.block.create_control()?;
        }
        match self.block.state() {
            BlockState::Realized => self.block.initialize()?,
            BlockState::Active => {}
            from => {
                return Err(Error::InvalidTransition {
                    from,
                    operation: "open",
                });
            }
        }
        self.baseline = self.block.current_settings();
        info!("Opened page '{}'", self.title);
        Ok(())
    }

    pub fn status(&self) -> Status {
        self.block.status()
    }

    /// Whether OK may be pressed
    pub fn is_valid(&self) -> bool {
        !self.status().is_error()
    }

    /// Apply the block's edits
    ///
    /// Returns `false` without touching the block while its status is ERROR,
    /// or when the block reports a failed commit.
    pub fn perform_ok(&mut self) -> bool {
        if !self.is_valid() {
            warn!("Page '{}' is invalid: {}", self.title, self.status());
            return false;
        }
        if !self.block.perform_ok() {
            return false;
        }
        self.baseline = self.block.current_settings();
        true
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the block is active.
    pub fn perform_defaults(&mut self) -> Result<()> {
        self.block.perform_defaults()
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the block is active.
    pub fn perform_cancel(&mut self) -> Result<()> {
        self.block.perform_cancel()
    }

    /// Whether the block's settings differ from those recorded at open
    pub fn needs_save_prompt(&self) -> bool {
        match (&self.baseline, self.block.current_settings()) {
            (Some(baseline), Some(current)) => {
                let changed = baseline.changed_keys(&current);
                if !changed.is_empty() {
                    debug!("Page '{}' changed: {}", self.title, changed.join(", "));
                }
                !changed.is_empty()
            }
            _ => false,
        }
    }

    /// Close the page, disposing the block
    ///
    /// Returns whether unapplied changes were dropped; hosts that want to
    /// prompt should check [`needs_save_prompt`](Self::needs_save_prompt) first.
    pub fn close(&mut self) -> bool {
        let unsaved = self.needs_save_prompt();
        self.dispose();
        unsaved
    }

    pub fn dispose(&mut self) {
        self.block.dispose();
    }
}
