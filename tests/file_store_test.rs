//! Integration tests for file-backed preference stores

mod common;

use common::*;
use prefstage::{
    Error, FilePreferenceStore, OverlayPreferenceStore, PreferenceKeys, PreferenceStore,
    PreferenceValue, PreferencesConfig,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

#[test]
fn test_overlay_commit_reaches_disk() {
    init_logging();
    let (dir, store) = file_store();
    let store = Arc::new(store);
    OccurrenceKeys::register_defaults(store.as_ref());

    let mut overlay = OverlayPreferenceStore::new(store.clone(), OccurrenceKeys::keys()).unwrap();
    overlay.set_value(DELAY, 900).unwrap();
    overlay.set_value(MARK, true).unwrap();
    overlay.propagate().unwrap();
    store.save().unwrap();

    let content = std::fs::read_to_string(store.path()).unwrap();
    let written: HashMap<String, String> = serde_json::from_str(&content).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written.get(DELAY).map(String::as_str), Some("900"));

    let config = PreferencesConfig::builder("prefstage-test")
        .config_dir(dir.path())
        .build();
    let reopened = FilePreferenceStore::open(config).unwrap();
    OccurrenceKeys::register_defaults(&reopened);
    assert_eq!(reopened.get(DELAY), Some(PreferenceValue::Int(900)));
}

#[test]
fn test_reload_notifies_listeners() {
    let (_dir, store) = file_store();
    OccurrenceKeys::register_defaults(&store);
    store.set(DELAY, PreferenceValue::Int(1)).unwrap();

    let events = Arc::new(AtomicUsize::new(0));
    let counter = events.clone();
    store.on_change(Arc::new(move |_event: &prefstage::PreferenceChangeEvent| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    // Nothing on disk yet: reloading drops the unsaved value
    store.reload().unwrap();
    assert_eq!(store.get_int(DELAY), 500);
    assert_eq!(events.load(Ordering::SeqCst), 1);
}

#[test]
fn test_corrupt_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("preferences.json"), "{ not json").unwrap();

    let config = PreferencesConfig::builder("prefstage-test")
        .config_dir(dir.path())
        .build();
    let err = FilePreferenceStore::open(config).err().unwrap();
    assert!(matches!(err, Error::Parse(_)));
    assert!(err.is_persistence_failure());
}

#[test]
fn test_env_override_beats_file_value() {
    let dir = TempDir::new().unwrap();
    let mut vars = HashMap::new();
    vars.insert("IDE_EDITOR_OCCURRENCES_MARK".to_string(), "false".to_string());

    let config = PreferencesConfig::builder("prefstage-test")
        .config_dir(dir.path())
        .with_env_prefix("ide")
        .with_env_source(vars)
        .build();
    let store = FilePreferenceStore::open(config).unwrap();
    OccurrenceKeys::register_defaults(&store);

    assert!(store.is_env_override(MARK));
    assert!(!store.get_boolean(MARK));
    assert!(!store.is_env_override(STICKY));
}
