//! Typed preference values and keys
//!
//! Every preference is addressed by a [`PreferenceKey`]: a name plus one of
//! six declared [`PreferenceType`]s. Stores persist values in a canonical
//! string form, so [`PreferenceValue`] knows how to render itself as a
//! string and how to parse one back for a given type.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Preference Type
// =============================================================================

/// Declared type of a preference key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceType {
    Boolean,
    String,
    Int,
    Long,
    Float,
    Double,
}

impl PreferenceType {
    /// Check whether a value of type `actual` can be stored under a key of this type
    ///
    /// Exact matches are accepted, as are the lossless widenings
    /// int → long and float → double.
    #[must_use]
    pub fn accepts(self, actual: PreferenceType) -> bool {
        self == actual
            || matches!(
                (self, actual),
                (PreferenceType::Long, PreferenceType::Int)
                    | (PreferenceType::Double, PreferenceType::Float)
            )
    }

    /// The value a store reports for a key of this type when it knows nothing about it
    #[must_use]
    pub fn zero_value(self) -> PreferenceValue {
        match self {
            PreferenceType::Boolean => PreferenceValue::Boolean(false),
            PreferenceType::String => PreferenceValue::String(String::new()),
            PreferenceType::Int => PreferenceValue::Int(0),
            PreferenceType::Long => PreferenceValue::Long(0),
            PreferenceType::Float => PreferenceValue::Float(0.0),
            PreferenceType::Double => PreferenceValue::Double(0.0),
        }
    }
}

impl fmt::Display for PreferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PreferenceType::Boolean => "boolean",
            PreferenceType::String => "string",
            PreferenceType::Int => "int",
            PreferenceType::Long => "long",
            PreferenceType::Float => "float",
            PreferenceType::Double => "double",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Preference Value
// =============================================================================

/// A typed preference value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PreferenceValue {
    Boolean(bool),
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl PreferenceValue {
    /// The type of this value
    #[must_use]
    pub fn preference_type(&self) -> PreferenceType {
        match self {
            PreferenceValue::Boolean(_) => PreferenceType::Boolean,
            PreferenceValue::String(_) => PreferenceType::String,
            PreferenceValue::Int(_) => PreferenceType::Int,
            PreferenceValue::Long(_) => PreferenceType::Long,
            PreferenceValue::Float(_) => PreferenceType::Float,
            PreferenceValue::Double(_) => PreferenceType::Double,
        }
    }

    /// Parse a stored string as a value of type `ty`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidValue` if `text` is not a valid literal for `ty`.
    pub fn parse(ty: PreferenceType, text: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidValue {
            key: ty.to_string(),
            reason,
        };
        let trimmed = text.trim();
        Ok(match ty {
            PreferenceType::String => PreferenceValue::String(text.to_string()),
            PreferenceType::Boolean => {
                if trimmed.eq_ignore_ascii_case("true") {
                    PreferenceValue::Boolean(true)
                } else if trimmed.eq_ignore_ascii_case("false") {
                    PreferenceValue::Boolean(false)
                } else {
                    return Err(invalid(format!("'{text}' is not a boolean")));
                }
            }
            PreferenceType::Int => PreferenceValue::Int(
                trimmed
                    .parse()
                    .map_err(|e| invalid(format!("'{text}' is not an int: {e}")))?,
            ),
            PreferenceType::Long => PreferenceValue::Long(
                trimmed
                    .parse()
                    .map_err(|e| invalid(format!("'{text}' is not a long: {e}")))?,
            ),
            PreferenceType::Float => {
                let n: f32 = trimmed
                    .parse()
                    .map_err(|e| invalid(format!("'{text}' is not a float: {e}")))?;
                if !n.is_finite() {
                    return Err(invalid(format!("'{text}' is not a finite float")));
                }
                PreferenceValue::Float(n)
            }
            PreferenceType::Double => {
                let n: f64 = trimmed
                    .parse()
                    .map_err(|e| invalid(format!("'{text}' is not a double: {e}")))?;
                if !n.is_finite() {
                    return Err(invalid(format!("'{text}' is not a finite double")));
                }
                PreferenceValue::Double(n)
            }
        })
    }

    /// Canonical string form used by persisted stores
    #[must_use]
    pub fn to_storage_string(&self) -> String {
        match self {
            PreferenceValue::Boolean(b) => b.to_string(),
            PreferenceValue::String(s) => s.clone(),
            PreferenceValue::Int(n) => n.to_string(),
            PreferenceValue::Long(n) => n.to_string(),
            PreferenceValue::Float(n) => n.to_string(),
            PreferenceValue::Double(n) => n.to_string(),
        }
    }

    /// Convert this value to type `ty`
    ///
    /// Strings are parsed, numbers are converted when the target can hold
    /// them, and anything else yields `None`.
    #[must_use]
    pub fn coerce(&self, ty: PreferenceType) -> Option<PreferenceValue> {
        if self.preference_type() == ty {
            return Some(self.clone());
        }
        match (self, ty) {
            (PreferenceValue::String(s), _) => PreferenceValue::parse(ty, s).ok(),
            (_, PreferenceType::String) => {
                Some(PreferenceValue::String(self.to_storage_string()))
            }
            (PreferenceValue::Int(n), PreferenceType::Long) => {
                Some(PreferenceValue::Long(i64::from(*n)))
            }
            (PreferenceValue::Int(n), PreferenceType::Double) => {
                Some(PreferenceValue::Double(f64::from(*n)))
            }
            (PreferenceValue::Long(n), PreferenceType::Int) => {
                i32::try_from(*n).ok().map(PreferenceValue::Int)
            }
            (PreferenceValue::Float(n), PreferenceType::Double) => {
                Some(PreferenceValue::Double(f64::from(*n)))
            }
            _ => None,
        }
    }

    /// Widen this value to the declared key type, or reject it
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKeyType` when `declared` does not accept this value's type.
    pub fn widen_to(self, key: &str, declared: PreferenceType) -> Result<PreferenceValue> {
        let actual = self.preference_type();
        if !declared.accepts(actual) {
            return Err(Error::InvalidKeyType {
                key: key.to_string(),
                declared,
                actual,
            });
        }
        match (self, declared) {
            (PreferenceValue::Int(n), PreferenceType::Long) => {
                Ok(PreferenceValue::Long(i64::from(n)))
            }
            (PreferenceValue::Float(n), PreferenceType::Double) => {
                Ok(PreferenceValue::Double(f64::from(n)))
            }
            (value, _) => Ok(value),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.coerce(PreferenceType::Boolean) {
            Some(PreferenceValue::Boolean(b)) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PreferenceValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self.coerce(PreferenceType::Int) {
            Some(PreferenceValue::Int(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self.coerce(PreferenceType::Long) {
            Some(PreferenceValue::Long(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            PreferenceValue::Float(n) => Some(*n),
            PreferenceValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self.coerce(PreferenceType::Double) {
            Some(PreferenceValue::Double(n)) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_storage_string())
    }
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        PreferenceValue::Boolean(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        PreferenceValue::String(value.to_string())
    }
}

impl From<String> for PreferenceValue {
    fn from(value: String) -> Self {
        PreferenceValue::String(value)
    }
}

impl From<i32> for PreferenceValue {
    fn from(value: i32) -> Self {
        PreferenceValue::Int(value)
    }
}

impl From<i64> for PreferenceValue {
    fn from(value: i64) -> Self {
        PreferenceValue::Long(value)
    }
}

impl From<f32> for PreferenceValue {
    fn from(value: f32) -> Self {
        PreferenceValue::Float(value)
    }
}

impl From<f64> for PreferenceValue {
    fn from(value: f64) -> Self {
        PreferenceValue::Double(value)
    }
}

// =============================================================================
// Preference Key
// =============================================================================

/// A declared (type, name) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreferenceKey {
    #[serde(rename = "type")]
    ty: PreferenceType,
    name: String,
}

impl PreferenceKey {
    pub fn new(ty: PreferenceType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(PreferenceType::Boolean, name)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(PreferenceType::String, name)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(PreferenceType::Int, name)
    }

    pub fn long(name: impl Into<String>) -> Self {
        Self::new(PreferenceType::Long, name)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(PreferenceType::Float, name)
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self::new(PreferenceType::Double, name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn preference_type(&self) -> PreferenceType {
        self.ty
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ty)
    }
}

// =============================================================================
// Tests
// =============================================================================
