//! Integration tests for settings page hosting and save prompting

mod common;

use common::*;
use prefstage::{
    ConfigurationBlock, FilePreferenceStore, OverlayBlockBuilder, PreferenceStore,
    PreferencesConfig, SettingsPage, VariablesBlock,
};
use std::sync::Arc;
use tempfile::TempDir;

fn variables_page(store: Arc<dyn PreferenceStore>) -> SettingsPage<VariablesBlock> {
    SettingsPage::new(
        "Classpath Variables",
        VariablesBlock::new(store).unwrap(),
    )
}

// =============================================================================
// Snapshot Prompting
// =============================================================================

#[test]
fn test_changed_variable_prompts_and_untouched_reopen_does_not() {
    init_logging();
    let store = Arc::new(prefstage::MemoryPreferenceStore::new());
    store.set("variable.FOO", "/a".into()).unwrap();

    let mut page = variables_page(store.clone());
    page.open().unwrap();
    assert!(page.block_mut().set_variable("FOO", "/b").is_ok());
    assert!(page.needs_save_prompt());
    // User declines the save
    assert!(page.close());
    assert_eq!(store.get_string("variable.FOO"), "/a");

    let mut page = variables_page(store.clone());
    page.open().unwrap();
    assert_eq!(page.block().variable("FOO"), Some("/a"));
    assert!(!page.needs_save_prompt());
    assert!(!page.close());
}

#[test]
fn test_edit_back_to_original_needs_no_prompt() {
    let store = Arc::new(prefstage::MemoryPreferenceStore::new());
    store.set("variable.FOO", "/a".into()).unwrap();

    let mut page = variables_page(store);
    page.open().unwrap();
    page.block_mut().set_variable("FOO", "/b");
    page.block_mut().set_variable("FOO", "/a");
    assert!(!page.needs_save_prompt());
}

#[test]
fn test_variables_persist_through_file_store() {
    let dir = TempDir::new().unwrap();
    let open_store = || {
        let config = PreferencesConfig::builder("prefstage-test")
            .config_dir(dir.path())
            .build();
        Arc::new(FilePreferenceStore::open(config).unwrap())
    };

    {
        let mut page = variables_page(open_store());
        page.open().unwrap();
        page.block_mut().set_variable("JRE_LIB", "/usr/lib/jvm/default");
        assert!(page.perform_ok());
        assert!(!page.close());
    }

    let store = open_store();
    assert_eq!(store.get_string("variable.JRE_LIB"), "/usr/lib/jvm/default");
}

// =============================================================================
// Validation Gating
// =============================================================================

#[test]
fn test_invalid_page_cannot_be_applied() {
    let store = occurrence_store();
    let block = OverlayBlockBuilder::new("Mark Occurrences", store.clone())
        .with_keys::<OccurrenceKeys>()
        .checkbox("Mark occurrences", MARK)
        .text_field("Delay (ms)", DELAY, None)
        .build()
        .unwrap();
    let mut page = SettingsPage::new("Mark Occurrences", block);
    page.open().unwrap();

    page.block_mut().select(MARK, false).unwrap();
    page.block_mut().set_text(DELAY, "later").unwrap();
    assert!(!page.is_valid());
    assert!(!page.perform_ok());
    assert!(store.get_boolean(MARK));

    page.block_mut().set_text(DELAY, "300").unwrap();
    assert!(page.is_valid());
    assert!(page.perform_ok());
    assert!(!store.get_boolean(MARK));
    assert_eq!(store.get_int(DELAY), 300);
    assert!(!page.needs_save_prompt());
}

#[test]
fn test_cancel_clears_prompt() {
    let store = occurrence_store();
    let block = OverlayBlockBuilder::new("Mark Occurrences", store)
        .with_keys::<OccurrenceKeys>()
        .checkbox("Mark occurrences", MARK)
        .build()
        .unwrap();
    let mut page = SettingsPage::new("Mark Occurrences", block);
    page.open().unwrap();

    page.block_mut().select(MARK, false).unwrap();
    assert!(page.needs_save_prompt());
    page.perform_cancel().unwrap();
    assert!(!page.needs_save_prompt());
}

#[test]
fn test_boxed_blocks_share_a_host_type() {
    let store = occurrence_store();
    let blocks: Vec<Box<dyn ConfigurationBlock>> = vec![
        Box::new(
            OverlayBlockBuilder::new("Mark Occurrences", store.clone())
                .with_keys::<OccurrenceKeys>()
                .checkbox("Mark occurrences", MARK)
                .build()
                .unwrap(),
        ),
        Box::new(VariablesBlock::new(store.clone()).unwrap()),
    ];

    let mut pages: Vec<SettingsPage<Box<dyn ConfigurationBlock>>> = blocks
        .into_iter()
        .map(|block| SettingsPage::new("Page", block))
        .collect();
    for page in &mut pages {
        page.open().unwrap();
        assert!(page.is_valid());
        assert!(page.perform_ok());
    }
    for page in &mut pages {
        page.dispose();
    }
    assert_eq!(store.listener_count(), 0);
}
