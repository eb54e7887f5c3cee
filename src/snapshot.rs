//! Structured snapshots of a page's settings
//!
//! A page records a snapshot when it opens and compares it with the
//! block's current snapshot when it closes; any difference means the user
//! should be asked whether to save.

use crate::store::PreferenceStore;
use crate::value::PreferenceValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered name → value mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsSnapshot(BTreeMap<String, PreferenceValue>);

impl SettingsSnapshot {
    /// Capture the effective values of `names` from `store`
    ///
    /// Names the store knows nothing about are left out.
    pub fn capture<'a>(
        store: &dyn PreferenceStore,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self(
            names
                .into_iter()
                .filter_map(|name| store.value(name).map(|value| (name.to_string(), value)))
                .collect(),
        )
    }

    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, PreferenceValue)>,
        K: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&PreferenceValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PreferenceValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Names added, removed, or changed between `self` and `other`, sorted
    pub fn changed_keys<'a>(&'a self, other: &'a SettingsSnapshot) -> Vec<&'a str> {
        let mut changed: Vec<&str> = self
            .0
            .iter()
            .filter(|(name, value)| other.0.get(*name) != Some(*value))
            .map(|(name, _)| name.as_str())
            .collect();
        changed.extend(
            other
                .0
                .keys()
                .filter(|name| !self.0.contains_key(*name))
                .map(String::as_str),
        );
        changed.sort_unstable();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPreferenceStore;

    #[test]
    fn test_capture_skips_unknown_names() {
        let store = MemoryPreferenceStore::with_defaults([(
            "variable.JRE_LIB",
            PreferenceValue::from("/usr/lib/jvm"),
        )]);
        let snapshot = SettingsSnapshot::capture(&store, ["variable.JRE_LIB", "variable.NONE"]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get("variable.JRE_LIB"),
            Some(&PreferenceValue::from("/usr/lib/jvm"))
        );
    }

    #[test]
    fn test_changed_keys() {
        let before = SettingsSnapshot::from_entries([
            ("FOO", PreferenceValue::from("/a")),
            ("BAR", PreferenceValue::from("/bar")),
        ]);
        let after = SettingsSnapshot::from_entries([
            ("FOO", PreferenceValue::from("/b")),
            ("BAZ", PreferenceValue::from("/baz")),
        ]);
        assert_ne!(before, after);
        assert_eq!(before.changed_keys(&after), ["BAR", "BAZ", "FOO"]);
        assert!(before.changed_keys(&before.clone()).is_empty());
    }

    #[test]
    fn test_values_containing_separators_stay_distinct() {
        // A flat joined-string comparison would treat these as equal
        let joined = SettingsSnapshot::from_entries([("A", PreferenceValue::from("x\0B\0y"))]);
        let split = SettingsSnapshot::from_entries([
            ("A", PreferenceValue::from("x")),
            ("B", PreferenceValue::from("y")),
        ]);
        assert_ne!(joined, split);
    }
}
