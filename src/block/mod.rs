//! Configuration blocks
//!
//! A configuration block is the reusable body of a preference or property
//! page. The host page drives it through a fixed lifecycle:
//!
//! ```text
//! Unrealized --create_control--> Realized --initialize--> Active
//! Active --perform_ok--> Applying --> Active
//! Active --perform_defaults / perform_cancel--> Discarding --> Active
//! any --dispose--> Disposed
//! ```
//!
//! [`Lifecycle`] implements the state machine once; block implementations
//! embed it and call its transition methods.

mod controls;
mod dependency;
mod overlay_block;
mod variables;

pub use controls::{CheckBox, Control, Form, TextField};
pub use dependency::DependencyGraph;
pub use overlay_block::{OverlayBlockBuilder, OverlayConfigurationBlock};
pub use variables::VariablesBlock;

use crate::error::{Error, Result};
use crate::snapshot::SettingsSnapshot;
use crate::status::Status;
use serde::{Deserialize, Serialize};

// =============================================================================
// Lifecycle
// =============================================================================

/// Lifecycle state of a configuration block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockState {
    #[default]
    Unrealized,
    Realized,
    Active,
    Applying,
    Discarding,
    Disposed,
}

/// Lifecycle state machine shared by block implementations
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    state: BlockState,
}

impl Lifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> BlockState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == BlockState::Active
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state == BlockState::Disposed
    }

    /// Unrealized → Realized
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` from any other state.
    pub fn realize(&mut self) -> Result<()> {
        self.transition(BlockState::Unrealized, BlockState::Realized, "create controls for")
    }

    /// Realized → Active
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` from any other state.
    pub fn activate(&mut self) -> Result<()> {
        self.transition(BlockState::Realized, BlockState::Active, "initialize")
    }

    /// Active → Applying
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the block is active.
    pub fn begin_apply(&mut self) -> Result<()> {
        self.transition(BlockState::Active, BlockState::Applying, "apply")
    }

    /// Active → Discarding
    ///
    /// `operation` names the caller in the error message.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the block is active.
    pub fn begin_discard(&mut self, operation: &'static str) -> Result<()> {
        self.transition(BlockState::Active, BlockState::Discarding, operation)
    }

    /// Applying or Discarding → Active; no-op otherwise
    pub fn finish(&mut self) {
        if matches!(self.state, BlockState::Applying | BlockState::Discarding) {
            self.state = BlockState::Active;
        }
    }

    /// Require the Active state for an edit
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the block is active.
    pub fn ensure_active(&self, operation: &'static str) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.state,
                operation,
            })
        }
    }

    /// Move to Disposed; returns `false` if already disposed
    pub fn dispose(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.state = BlockState::Disposed;
        true
    }

    fn transition(
        &mut self,
        from: BlockState,
        to: BlockState,
        operation: &'static str,
    ) -> Result<()> {
        if self.state != from {
            return Err(Error::InvalidTransition {
                from: self.state,
                operation,
            });
        }
        self.state = to;
        Ok(())
    }
}

// =============================================================================
// Configuration Block
// =============================================================================

/// Reusable body of a settings page
pub trait ConfigurationBlock {
    /// Build the block's controls (Unrealized → Realized)
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` if called twice or after dispose.
    fn create_control(&mut self) -> Result<()>;

    /// Pull current values into the controls (Realized → Active)
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` if the controls were not created.
    fn initialize(&mut self) -> Result<()>;

    /// Commit edits and save the underlying store
    ///
    /// Returns `false` if the commit failed; the failure is reported through
    /// [`status`](Self::status) rather than as an error.
    fn perform_ok(&mut self) -> bool;

    /// Reset every managed setting to its default and refresh the controls
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the block is active.
    fn perform_defaults(&mut self) -> Result<()>;

    /// Discard uncommitted edits and refresh the controls
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the block is active.
    fn perform_cancel(&mut self) -> Result<()>;

    /// Release listeners registered on shared stores; idempotent
    fn dispose(&mut self);

    fn state(&self) -> BlockState;

    /// Most severe status of the block and its controls
    fn status(&self) -> Status;

    /// Snapshot of the settings the block is editing, for save prompting
    fn current_settings(&self) -> Option<SettingsSnapshot> {
        None
    }
}

impl<B: ConfigurationBlock + ?Sized> ConfigurationBlock for Box<B> {
    fn create_control(&mut self) -> Result<()> {
        (**self).create_control()
    }

    fn initialize(&mut self) -> Result<()> {
        (**self).initialize()
    }

    fn perform_ok(&mut self) -> bool {
        (**self).perform_ok()
    }

    fn perform_defaults(&mut self) -> Result<()> {
        (**self).perform_defaults()
    }

    fn perform_cancel(&mut self) -> Result<()> {
        (**self).perform_cancel()
    }

    fn dispose(&mut self) {
        (**self).dispose();
    }

    fn state(&self) -> BlockState {
        (**self).state()
    }

    fn status(&self) -> Status {
        (**self).status()
    }

    fn current_settings(&self) -> Option<SettingsSnapshot> {
        (**self).current_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), BlockState::Unrealized);

        lifecycle.realize().unwrap();
        lifecycle.activate().unwrap();
        lifecycle.begin_apply().unwrap();
        assert_eq!(lifecycle.state(), BlockState::Applying);
        lifecycle.finish();
        lifecycle.begin_discard("cancel").unwrap();
        lifecycle.finish();
        assert!(lifecycle.is_active());

        assert!(lifecycle.dispose());
        assert!(!lifecycle.dispose());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut lifecycle = Lifecycle::new();
        let err = lifecycle.activate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: BlockState::Unrealized,
                operation: "initialize"
            }
        ));

        lifecycle.realize().unwrap();
        assert!(lifecycle.realize().is_err());
        assert!(lifecycle.begin_apply().is_err());

        lifecycle.dispose();
        assert!(lifecycle.ensure_active("edit").is_err());
        assert_eq!(
            lifecycle.activate().unwrap_err().to_string(),
            "Cannot initialize a configuration block in state Disposed"
        );
    }
}
