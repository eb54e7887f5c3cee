//! Common test utilities for prefstage integration tests
//!
//! Provides shared key declarations, store fixtures, and a store wrapper
//! that can be told to fail writes.

#![allow(dead_code)]

use prefstage::{
    ChangeCallback, Error, FilePreferenceStore, ListenerId, MemoryPreferenceStore,
    PreferenceKey, PreferenceKeys, PreferenceStore, PreferenceValue, PreferencesConfig, Result,
    preferences,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

/// Route log output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// Key Declarations
// =============================================================================

pub const MARK: &str = "editor.occurrences.mark";
pub const STICKY: &str = "editor.occurrences.sticky";
pub const DELAY: &str = "editor.occurrences.delay";
pub const STYLE: &str = "editor.occurrences.style";

/// Keys of a "Mark Occurrences" page
pub struct OccurrenceKeys;

impl PreferenceKeys for OccurrenceKeys {
    fn default_values() -> Vec<(PreferenceKey, PreferenceValue)> {
        preferences! {
            MARK => true,
            STICKY => false,
            DELAY => 500,
            STYLE => "box",
        }
    }
}

/// Shared in-memory store with the occurrence defaults registered
pub fn occurrence_store() -> Arc<MemoryPreferenceStore> {
    let store = Arc::new(MemoryPreferenceStore::new());
    OccurrenceKeys::register_defaults(store.as_ref());
    store
}

/// A file-backed store in a fresh temporary directory
pub fn file_store() -> (TempDir, FilePreferenceStore) {
    let dir = TempDir::new().unwrap();
    let config = PreferencesConfig::builder("prefstage-test")
        .config_dir(dir.path())
        .build();
    let store = FilePreferenceStore::open(config).unwrap();
    (dir, store)
}

// =============================================================================
// Failing Store
// =============================================================================

/// Store whose writes can be switched to fail
pub struct FailingStore {
    inner: MemoryPreferenceStore,
    fail_writes: AtomicBool,
    attempted_writes: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        let inner = MemoryPreferenceStore::new();
        OccurrenceKeys::register_defaults(&inner);
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
            attempted_writes: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn attempted_writes(&self) -> usize {
        self.attempted_writes.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listener_count()
    }

    fn check(&self, name: &str) -> Result<()> {
        self.attempted_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::PersistenceFailure {
                key: name.to_string(),
                reason: "disk full".to_string(),
            });
        }
        Ok(())
    }
}

impl PreferenceStore for FailingStore {
    fn get(&self, name: &str) -> Option<PreferenceValue> {
        self.inner.get(name)
    }

    fn get_default(&self, name: &str) -> Option<PreferenceValue> {
        self.inner.get_default(name)
    }

    fn set(&self, name: &str, value: PreferenceValue) -> Result<()> {
        self.check(name)?;
        self.inner.set(name, value)
    }

    fn set_default(&self, name: &str, value: PreferenceValue) {
        self.inner.set_default(name, value);
    }

    fn set_to_default(&self, name: &str) -> Result<()> {
        self.check(name)?;
        self.inner.set_to_default(name)
    }

    fn names(&self) -> Vec<String> {
        self.inner.names()
    }

    fn save(&self) -> Result<()> {
        self.inner.save()
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
