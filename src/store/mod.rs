//! Preference store capability and implementations
//!
//! A [`PreferenceStore`] maps names to typed values and registered defaults
//! and notifies listeners when an effective value changes. Three
//! implementations are provided:
//!
//! - [`MemoryPreferenceStore`]: in-memory, the building block of the others
//! - [`FilePreferenceStore`]: persisted through a [`StorageBackend`](crate::StorageBackend)
//! - [`ScopedPreferenceStore`]: a project scope layered over a workspace scope

mod file;
mod memory;
mod scoped;

pub use file::FilePreferenceStore;
pub use memory::MemoryPreferenceStore;
pub use scoped::ScopedPreferenceStore;

use crate::error::Result;
use crate::events::{ChangeCallback, ListenerId};
use crate::value::PreferenceValue;

/// Trait for key/value preference stores
///
/// Stores are shared across every open page, so all methods take `&self`
/// and implementations synchronize internally.
pub trait PreferenceStore: Send + Sync {
    /// The explicitly set value for `name`, if any
    fn get(&self, name: &str) -> Option<PreferenceValue>;

    /// The registered default for `name`, if any
    fn get_default(&self, name: &str) -> Option<PreferenceValue>;

    /// Set an explicit value
    ///
    /// Setting a value equal to the default removes the explicit value.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKeyType` if the value cannot be stored under the
    /// type of the registered default; implementations backed by external
    /// systems may return persistence errors.
    fn set(&self, name: &str, value: PreferenceValue) -> Result<()>;

    /// Register the default value for `name`
    fn set_default(&self, name: &str, value: PreferenceValue);

    /// Remove the explicit value so `name` reports its default again
    ///
    /// # Errors
    ///
    /// Implementations backed by external systems may return persistence errors.
    fn set_to_default(&self, name: &str) -> Result<()>;

    /// Names that currently hold an explicit value, sorted
    fn names(&self) -> Vec<String>;

    /// Flush explicit values to backing storage
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the backing storage cannot be written.
    fn save(&self) -> Result<()> {
        Ok(())
    }

    /// Whether there are changes not yet flushed by [`save`](Self::save)
    fn needs_saving(&self) -> bool {
        false
    }

    /// Register a change listener
    fn on_change(&self, callback: ChangeCallback) -> ListenerId;

    /// Remove a change listener; returns `false` if it was not registered
    fn remove_listener(&self, id: ListenerId) -> bool;

    // =========================================================================
    // Provided accessors
    // =========================================================================

    /// The effective value: explicit value, else default
    fn value(&self, name: &str) -> Option<PreferenceValue> {
        self.get(name).or_else(|| self.get_default(name))
    }

    fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Whether `name` holds no explicit value
    ///
    /// Stores that keep raw values they cannot read as the declared type
    /// should report those as explicit, so `set_to_default` still clears them.
    fn is_default(&self, name: &str) -> bool {
        self.get(name).is_none()
    }

    fn get_boolean(&self, name: &str) -> bool {
        self.value(name)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn get_string(&self, name: &str) -> String {
        self.value(name)
            .map(|v| v.to_storage_string())
            .unwrap_or_default()
    }

    fn get_int(&self, name: &str) -> i32 {
        self.value(name).and_then(|v| v.as_int()).unwrap_or(0)
    }

    fn get_long(&self, name: &str) -> i64 {
        self.value(name).and_then(|v| v.as_long()).unwrap_or(0)
    }

    fn get_float(&self, name: &str) -> f32 {
        self.value(name).and_then(|v| v.as_float()).unwrap_or(0.0)
    }

    fn get_double(&self, name: &str) -> f64 {
        self.value(name).and_then(|v| v.as_double()).unwrap_or(0.0)
    }
}
