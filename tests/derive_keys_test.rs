//! Integration tests for the `DerivePreferenceKeys` macro

use prefstage::{
    DerivePreferenceKeys, MemoryPreferenceStore, OverlayPreferenceStore, PreferenceKey,
    PreferenceKeys, PreferenceStore, PreferenceType, PreferenceValue,
};
use std::sync::Arc;

// =============================================================================
// Basic Derive Tests
// =============================================================================

#[derive(DerivePreferenceKeys)]
#[preferences(prefix = "editor.occurrences")]
struct OccurrencePreferences {
    mark: bool,
    style: String,

    #[preference(name = "delay_ms")]
    delay: i32,

    history: i64,
    opacity: f32,
    zoom: f64,

    #[preference(skip)]
    #[allow(dead_code)]
    scratch: Vec<String>,
}

impl Default for OccurrencePreferences {
    fn default() -> Self {
        Self {
            mark: true,
            style: "box".to_string(),
            delay: 500,
            history: 10_000,
            opacity: 0.5,
            zoom: 1.0,
            scratch: Vec::new(),
        }
    }
}

#[test]
fn test_keys_and_types() {
    let keys = OccurrencePreferences::keys();
    assert_eq!(
        keys,
        [
            PreferenceKey::boolean("editor.occurrences.mark"),
            PreferenceKey::string("editor.occurrences.style"),
            PreferenceKey::int("editor.occurrences.delay_ms"),
            PreferenceKey::long("editor.occurrences.history"),
            PreferenceKey::float("editor.occurrences.opacity"),
            PreferenceKey::double("editor.occurrences.zoom"),
        ]
    );
}

#[test]
fn test_defaults_come_from_default_impl() {
    let defaults = OccurrencePreferences::default_values();
    assert_eq!(defaults[0].1, PreferenceValue::Boolean(true));
    assert_eq!(defaults[1].1, PreferenceValue::from("box"));
    assert_eq!(defaults[2].1, PreferenceValue::Int(500));

    let store = MemoryPreferenceStore::new();
    OccurrencePreferences::register_defaults(&store);
    assert_eq!(store.get_int("editor.occurrences.delay_ms"), 500);
    assert!(store.get_boolean("editor.occurrences.mark"));
}

// =============================================================================
// Nested and Unprefixed Structs
// =============================================================================

#[derive(Default, DerivePreferenceKeys)]
struct FoldingPreferences {
    enabled: bool,
    min_lines: u16,
}

#[derive(Default, DerivePreferenceKeys)]
#[preferences(prefix = "editor")]
struct EditorPreferences {
    folding: FoldingPreferences,
    tab_width: u8,
}

#[test]
fn test_nested_keys_are_placed_under_field() {
    let keys = EditorPreferences::keys();
    let names: Vec<&str> = keys.iter().map(PreferenceKey::name).collect();
    assert_eq!(
        names,
        [
            "editor.folding.enabled",
            "editor.folding.min_lines",
            "editor.tab_width"
        ]
    );
    assert_eq!(keys[1].preference_type(), PreferenceType::Int);
}

#[test]
fn test_derived_keys_drive_overlay() {
    let store = Arc::new(MemoryPreferenceStore::new());
    OccurrencePreferences::register_defaults(store.as_ref());
    let mut overlay =
        OverlayPreferenceStore::new(store.clone(), OccurrencePreferences::keys()).unwrap();

    overlay.set_value("editor.occurrences.zoom", 2.0).unwrap();
    overlay.propagate().unwrap();
    assert_eq!(store.get_double("editor.occurrences.zoom"), 2.0);
}
