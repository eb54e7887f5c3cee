//! Headless controls
//!
//! A control is a labelled value bound to one preference key plus an
//! enabled flag. Blocks keep their controls in a [`Form`] and look them up
//! by key name.

use crate::error::{Error, Result};
use crate::status::Status;
use crate::validation::FieldValidator;
use crate::value::{PreferenceKey, PreferenceType, PreferenceValue};
use std::collections::HashMap;

// =============================================================================
// Check Box
// =============================================================================

/// A check box bound to a boolean key
#[derive(Debug, Clone)]
pub struct CheckBox {
    key: PreferenceKey,
    label: String,
    enabled: bool,
    selected: bool,
}

impl CheckBox {
    /// # Errors
    ///
    /// Returns `Error::InvalidKeyType` unless `key` is boolean.
    pub fn new(label: impl Into<String>, key: PreferenceKey) -> Result<Self> {
        if key.preference_type() != PreferenceType::Boolean {
            return Err(Error::InvalidKeyType {
                key: key.name().to_string(),
                declared: key.preference_type(),
                actual: PreferenceType::Boolean,
            });
        }
        Ok(Self {
            key,
            label: label.into(),
            enabled: true,
            selected: false,
        })
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

// =============================================================================
// Text Field
// =============================================================================

/// A text field bound to a string or numeric key
///
/// The field always keeps what the user typed. Text that fails validation,
/// or does not parse as the key's type, leaves the field in ERROR status.
#[derive(Debug, Clone)]
pub struct TextField {
    key: PreferenceKey,
    label: String,
    enabled: bool,
    text: String,
    validator: Option<FieldValidator>,
    status: Status,
}

impl TextField {
    /// # Errors
    ///
    /// Returns `Error::InvalidKeyType` if `key` is boolean.
    pub fn new(
        label: impl Into<String>,
        key: PreferenceKey,
        validator: Option<FieldValidator>,
    ) -> Result<Self> {
        if key.preference_type() == PreferenceType::Boolean {
            return Err(Error::InvalidKeyType {
                key: key.name().to_string(),
                declared: PreferenceType::Boolean,
                actual: PreferenceType::String,
            });
        }
        Ok(Self {
            key,
            label: label.into(),
            enabled: true,
            text: String::new(),
            validator,
            status: Status::ok(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Replace the text and re-validate; returns the value to stage, if valid
    pub fn set_text(&mut self, text: &str) -> Option<PreferenceValue> {
        self.text = text.to_string();
        match self.parse() {
            Ok(value) => {
                self.status = Status::ok();
                Some(value)
            }
            Err(status) => {
                self.status = status;
                None
            }
        }
    }

    fn parse(&self) -> std::result::Result<PreferenceValue, Status> {
        if let Some(validator) = &self.validator {
            let status = validator.validate(&self.text);
            if !status.is_ok() {
                return Err(status);
            }
        }
        let ty = self.key.preference_type();
        PreferenceValue::parse(ty, &self.text).map_err(|_| {
            Status::error(format!("{}: '{}' is not a valid {ty}", self.label, self.text))
        })
    }
}

// =============================================================================
// Control
// =============================================================================

/// Any control a block can hold
#[derive(Debug, Clone)]
pub enum Control {
    CheckBox(CheckBox),
    TextField(TextField),
}

impl Control {
    pub fn key(&self) -> &PreferenceKey {
        match self {
            Control::CheckBox(c) => &c.key,
            Control::TextField(t) => &t.key,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Control::CheckBox(c) => &c.label,
            Control::TextField(t) => &t.label,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Control::CheckBox(c) => c.enabled,
            Control::TextField(t) => t.enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            Control::CheckBox(c) => c.enabled = enabled,
            Control::TextField(t) => t.enabled = enabled,
        }
    }

    /// Validation status; check boxes are always OK
    pub fn status(&self) -> Status {
        match self {
            Control::CheckBox(_) => Status::ok(),
            Control::TextField(t) => t.status.clone(),
        }
    }

    /// Show `value` in the control, as when loading from a store
    pub fn show(&mut self, value: &PreferenceValue) {
        match self {
            Control::CheckBox(c) => c.selected = value.as_bool().unwrap_or(false),
            Control::TextField(t) => {
                t.set_text(&value.to_storage_string());
            }
        }
    }
}

// =============================================================================
// Form
// =============================================================================

/// Controls of one block, in insertion order, indexed by key name
#[derive(Debug, Clone, Default)]
pub struct Form {
    controls: Vec<Control>,
    index: HashMap<String, usize>,
}

impl Form {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a control
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a control is already bound to the same key.
    pub fn add(&mut self, control: Control) -> Result<()> {
        let name = control.key().name().to_string();
        if self.index.contains_key(&name) {
            return Err(Error::Config(format!(
                "Key '{name}' is already bound to a control"
            )));
        }
        self.index.insert(name, self.controls.len());
        self.controls.push(control);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Control> {
        self.index.get(name).map(|&i| &self.controls[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Control> {
        self.index.get(name).map(|&i| &mut self.controls[i])
    }

    /// # Errors
    ///
    /// Returns `Error::UnknownKey` if no control is bound to `name`, or
    /// `Error::InvalidKeyType` if it is not a check box.
    pub fn checkbox(&self, name: &str) -> Result<&CheckBox> {
        match self.get(name) {
            Some(Control::CheckBox(c)) => Ok(c),
            Some(other) => Err(not_a(other, PreferenceType::Boolean)),
            None => Err(Error::UnknownKey(name.to_string())),
        }
    }

    /// # Errors
    ///
    /// See [`checkbox`](Self::checkbox).
    pub fn checkbox_mut(&mut self, name: &str) -> Result<&mut CheckBox> {
        match self.get_mut(name) {
            Some(Control::CheckBox(c)) => Ok(c),
            Some(other) => Err(not_a(other, PreferenceType::Boolean)),
            None => Err(Error::UnknownKey(name.to_string())),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::UnknownKey` if no control is bound to `name`, or
    /// `Error::InvalidKeyType` if it is not a text field.
    pub fn text_field(&self, name: &str) -> Result<&TextField> {
        match self.get(name) {
            Some(Control::TextField(t)) => Ok(t),
            Some(other) => Err(not_a(other, PreferenceType::String)),
            None => Err(Error::UnknownKey(name.to_string())),
        }
    }

    /// # Errors
    ///
    /// See [`text_field`](Self::text_field).
    pub fn text_field_mut(&mut self, name: &str) -> Result<&mut TextField> {
        match self.get_mut(name) {
            Some(Control::TextField(t)) => Ok(t),
            Some(other) => Err(not_a(other, PreferenceType::String)),
            None => Err(Error::UnknownKey(name.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Control> {
        self.controls.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Control> {
        self.controls.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Most severe status over every control
    pub fn status(&self) -> Status {
        let statuses: Vec<Status> = self.controls.iter().map(Control::status).collect();
        Status::most_severe(&statuses)
    }
}

fn not_a(control: &Control, wanted: PreferenceType) -> Error {
    Error::InvalidKeyType {
        key: control.key().name().to_string(),
        declared: control.key().preference_type(),
        actual: wanted,
    }
}
