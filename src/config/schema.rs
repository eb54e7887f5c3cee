//! Key declaration for configuration blocks
//!
//! A block declares the keys it manages once, at construction. Implement
//! [`PreferenceKeys`] by hand, build the list with the [`preferences!`]
//! macro, or derive it with `#[derive(PreferenceKeys)]` (requires the
//! `derive` feature).
//!
//! ```rust
//! use prefstage::{preferences, PreferenceKeys, PreferenceKey, PreferenceValue};
//!
//! struct FoldingKeys;
//!
//! impl PreferenceKeys for FoldingKeys {
//!     fn default_values() -> Vec<(PreferenceKey, PreferenceValue)> {
//!         preferences! {
//!             "editor.folding.enabled" => true,
//!             "editor.folding.comments" => false,
//!             "editor.folding.min_lines" => 3,
//!         }
//!     }
//! }
//!
//! assert_eq!(FoldingKeys::keys()[2], PreferenceKey::int("editor.folding.min_lines"));
//! ```

use crate::store::PreferenceStore;
use crate::value::{PreferenceKey, PreferenceValue};

/// Trait for types that declare a set of preference keys with defaults
pub trait PreferenceKeys {
    /// Every managed key paired with its default, in declaration order
    fn default_values() -> Vec<(PreferenceKey, PreferenceValue)>;

    /// The managed keys, in declaration order
    #[must_use]
    fn keys() -> Vec<PreferenceKey> {
        Self::default_values()
            .into_iter()
            .map(|(key, _)| key)
            .collect()
    }

    /// Install every default into `store`
    fn register_defaults(store: &dyn PreferenceStore) {
        for (key, value) in Self::default_values() {
            store.set_default(key.name(), value);
        }
    }
}

/// Macro for building a `(PreferenceKey, PreferenceValue)` list
///
/// Each key's type is taken from its default value.
///
/// # Example
/// ```rust
/// use prefstage::{preferences, PreferenceType};
///
/// let defaults = preferences! {
///     "editor.smart_tab" => true,
///     "editor.tab_width" => 4,
///     "editor.font" => "monospace",
/// };
/// assert_eq!(defaults[1].0.preference_type(), PreferenceType::Int);
/// ```
#[macro_export]
macro_rules! preferences {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut list: Vec<($crate::PreferenceKey, $crate::PreferenceValue)> = Vec::new();
        $(
            let value = $crate::PreferenceValue::from($value);
            list.push(($crate::PreferenceKey::new(value.preference_type(), $key), value));
        )*
        list
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPreferenceStore;
    use crate::value::PreferenceType;

    struct SmartTypingKeys;

    impl PreferenceKeys for SmartTypingKeys {
        fn default_values() -> Vec<(PreferenceKey, PreferenceValue)> {
            crate::preferences! {
                "typing.close_strings" => true,
                "typing.close_brackets" => true,
                "typing.tab_width" => 4,
                "typing.wrap_column" => 120_i64,
            }
        }
    }

    #[test]
    fn test_keys_follow_declaration_order() {
        let keys = SmartTypingKeys::keys();
        let names: Vec<&str> = keys.iter().map(PreferenceKey::name).collect();
        assert_eq!(
            names,
            [
                "typing.close_strings",
                "typing.close_brackets",
                "typing.tab_width",
                "typing.wrap_column"
            ]
        );
        assert_eq!(keys[3].preference_type(), PreferenceType::Long);
    }

    #[test]
    fn test_register_defaults() {
        let store = MemoryPreferenceStore::new();
        SmartTypingKeys::register_defaults(&store);

        assert!(store.get_boolean("typing.close_strings"));
        assert_eq!(store.get_int("typing.tab_width"), 4);
        assert!(store.is_default("typing.tab_width"));
    }
}
