//! Store configuration and key declaration
//!
//! This module contains the foundational types for setting up stores:
//! - `PreferencesConfig` - Where and how a file-backed store persists
//! - `PreferenceKeys` - Trait for declaring a block's keys and defaults
//! - `EnvSource` - Pluggable environment lookup for overrides

mod schema;
mod types;

pub use schema::PreferenceKeys;
pub use types::{DefaultEnvSource, EnvSource, PreferencesConfig, PreferencesConfigBuilder};
