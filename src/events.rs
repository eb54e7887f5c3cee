//! Change notification for preference stores
//!
//! Provides reactive callbacks for preference modifications. A store owns
//! one [`ListenerRegistry`] and notifies it after every change of an
//! effective value.

use crate::sync::RwLockExt;
use crate::value::PreferenceValue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A single preference change
///
/// `None` means the key had (or now has) no explicit value.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceChangeEvent {
    pub name: String,
    pub old_value: Option<PreferenceValue>,
    pub new_value: Option<PreferenceValue>,
}

impl PreferenceChangeEvent {
    pub fn new(
        name: impl Into<String>,
        old_value: Option<PreferenceValue>,
        new_value: Option<PreferenceValue>,
    ) -> Self {
        Self {
            name: name.into(),
            old_value,
            new_value,
        }
    }
}

/// Type alias for a change callback
pub type ChangeCallback = Arc<dyn Fn(&PreferenceChangeEvent) + Send + Sync>;

/// Handle returned on registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Manages event listeners for preference changes
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, ChangeCallback)>>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(Vec::new()),
        }
    }

    fn allocate_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a listener called for every change
    pub fn on_change<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&PreferenceChangeEvent) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        self.listeners
            .write_recovered()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a listener by id
    ///
    /// Returns `false` if no listener with that id was registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write_recovered();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Notify all listeners about a change
    ///
    /// Callbacks are collected before any is invoked, so a callback may
    /// register or remove listeners on this registry.
    pub fn notify(&self, event: &PreferenceChangeEvent) {
        let callbacks: Vec<ChangeCallback> = self
            .listeners
            .read_recovered()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in callbacks {
            callback(event);
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.read_recovered().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read_recovered().is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
