//! # prefstage - Staged Preference Editing
//!
//! The reusable core behind IDE-style preference and property pages: edits
//! are staged in an overlay and reach the shared preference store only when
//! the user presses OK.
//!
//! ## Features
//!
//! - **Preference Stores**: Typed key/value stores with defaults and change listeners,
//!   in memory or persisted to JSON/TOML files
//! - **Overlay Store**: Buffers a page's edits; `propagate()` commits, `load()` discards
//! - **Configuration Blocks**: A fixed create/initialize/ok/defaults/cancel/dispose lifecycle
//! - **Master/Slave Controls**: Check boxes that enable or disable dependent controls
//! - **Status Reporting**: Field validation and commit failures surface as `Status`
//! - **Save Prompting**: Snapshot comparison decides whether closing needs a prompt
//! - **Project Scope**: Project-specific settings layered over workspace settings
//!
//! ## Quick Start
//!
//! ```rust
//! use prefstage::{
//!     preferences, ConfigurationBlock, MemoryPreferenceStore, OverlayBlockBuilder,
//!     PreferenceKey, PreferenceKeys, PreferenceStore, PreferenceValue, SettingsPage,
//! };
//! use std::sync::Arc;
//!
//! struct FoldingKeys;
//!
//! impl PreferenceKeys for FoldingKeys {
//!     fn default_values() -> Vec<(PreferenceKey, PreferenceValue)> {
//!         preferences! {
//!             "editor.folding.enabled" => true,
//!             "editor.folding.comments" => false,
//!         }
//!     }
//! }
//!
//! let store = Arc::new(MemoryPreferenceStore::new());
//! let block = OverlayBlockBuilder::new("Folding", store.clone())
//!     .with_keys::<FoldingKeys>()
//!     .checkbox("Enable folding", "editor.folding.enabled")
//!     .checkbox("Fold comments", "editor.folding.comments")
//!     .depends_on("editor.folding.comments", "editor.folding.enabled")
//!     .build()?;
//!
//! let mut page = SettingsPage::new("Folding", block);
//! page.open()?;
//! page.block_mut().select("editor.folding.comments", true)?;
//! assert!(page.needs_save_prompt());
//!
//! assert!(page.perform_ok());
//! assert!(store.get_boolean("editor.folding.comments"));
//! page.close();
//! # Ok::<(), prefstage::Error>(())
//! ```
//!
//! ## Persisted Stores
//!
//! ```rust,no_run
//! use prefstage::{FilePreferenceStore, PreferenceStore, PreferencesConfig};
//!
//! # fn example() -> prefstage::Result<()> {
//! let config = PreferencesConfig::builder("my-ide")
//!     .config_dir("~/.config/my-ide")
//!     .with_env_prefix("MY_IDE")
//!     .build();
//! let store = FilePreferenceStore::open(config)?;
//! store.set("editor.tab_width", 8.into())?;
//! store.save()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Default Value Behavior
//!
//! Setting a preference to its default **removes the explicit value**, so
//! preference files only contain user customizations and changing a default
//! in code reaches every user who never customized it.

// Core modules
mod error;
mod events;
mod overlay;
mod page;
mod snapshot;
mod status;
mod sync;
mod validation;
mod value;
pub mod storage;

// Grouped modules
pub mod block;
pub mod config;
pub mod store;

// Re-exports from core
pub use error::{Error, Result};
pub use events::{ChangeCallback, ListenerId, ListenerRegistry, PreferenceChangeEvent};
pub use overlay::OverlayPreferenceStore;
pub use page::SettingsPage;
pub use snapshot::SettingsSnapshot;
pub use status::{Severity, Status, StatusListener};
pub use storage::{JsonStorage, StorageBackend};
pub use validation::{FieldValidator, ValidatorFn};
pub use value::{PreferenceKey, PreferenceType, PreferenceValue};

#[cfg(feature = "toml")]
pub use storage::TomlStorage;

// Re-exports from grouped modules
pub use block::{
    BlockState, CheckBox, ConfigurationBlock, Control, DependencyGraph, Form, Lifecycle,
    OverlayBlockBuilder, OverlayConfigurationBlock, TextField, VariablesBlock,
};
pub use config::{DefaultEnvSource, EnvSource, PreferenceKeys, PreferencesConfig, PreferencesConfigBuilder};
pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, ScopedPreferenceStore};

// Derive macro re-export (requires `derive` feature)
/// Derive macro for auto-generating `PreferenceKeys` implementations.
///
/// # Example
///
/// ```rust,ignore
/// use prefstage::DerivePreferenceKeys;
///
/// #[derive(Default, DerivePreferenceKeys)]
/// #[preferences(prefix = "editor.folding")]
/// struct FoldingPreferences {
///     enabled: bool,
///     #[preference(name = "min_lines")]
///     minimum_lines: i32,
/// }
/// ```
#[cfg(feature = "derive")]
pub use prefstage_derive::PreferenceKeys as DerivePreferenceKeys;
