//! Field validation for text controls
//!
//! A [`FieldValidator`] checks the raw text of a field against a list of
//! rules and reports the first failure as an ERROR [`Status`]. Validation
//! itself never fails; a bad regex is rejected when the validator is built.
//!
//! ```rust
//! use prefstage::FieldValidator;
//!
//! let validator = FieldValidator::new("Tab width").non_empty().int_range(1, 16);
//! assert!(validator.validate("4").is_ok());
//! assert!(validator.validate("40").is_error());
//! ```

use crate::error::Result;
use crate::status::Status;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Custom validator function: returns an error message on failure
pub type ValidatorFn = Arc<dyn Fn(&str) -> std::result::Result<(), String> + Send + Sync>;

#[derive(Clone)]
enum Rule {
    NonEmpty,
    Pattern { regex: Regex, message: String },
    IntRange { min: i64, max: i64 },
    Custom(ValidatorFn),
}

impl Rule {
    fn check(&self, label: &str, text: &str) -> std::result::Result<(), String> {
        match self {
            Rule::NonEmpty => {
                if text.trim().is_empty() {
                    return Err(format!("{label} must not be empty"));
                }
            }
            Rule::Pattern { regex, message } => {
                if !regex.is_match(text) {
                    return Err(message.clone());
                }
            }
            Rule::IntRange { min, max } => {
                let number: i64 = text
                    .trim()
                    .parse()
                    .map_err(|_| format!("{label} must be a whole number"))?;
                if number < *min {
                    return Err(format!("{label} must be at least {min}"));
                }
                if number > *max {
                    return Err(format!("{label} must be at most {max}"));
                }
            }
            Rule::Custom(validator) => validator(text)?,
        }
        Ok(())
    }
}

/// Ordered set of validation rules for one field
#[derive(Clone)]
pub struct FieldValidator {
    label: String,
    rules: Vec<Rule>,
}

impl FieldValidator {
    /// Create a validator; `label` names the field in messages
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rules: Vec::new(),
        }
    }

    /// Reject empty or whitespace-only text
    #[must_use]
    pub fn non_empty(mut self) -> Self {
        self.rules.push(Rule::NonEmpty);
        self
    }

    /// Require the text to match `pattern`, reporting `message` otherwise
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if `pattern` is not a valid regex.
    pub fn pattern(mut self, pattern: &str, message: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        self.rules.push(Rule::Pattern {
            regex,
            message: message.into(),
        });
        Ok(self)
    }

    /// Require a whole number in `min..=max`
    #[must_use]
    pub fn int_range(mut self, min: i64, max: i64) -> Self {
        self.rules.push(Rule::IntRange { min, max });
        self
    }

    /// Add a custom rule
    #[must_use]
    pub fn custom<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push(Rule::Custom(Arc::new(validator)));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check `text` against every rule in order, stopping at the first failure
    pub fn validate(&self, text: &str) -> Status {
        for rule in &self.rules {
            if let Err(message) = rule.check(&self.label, text) {
                return Status::error(message);
            }
        }
        Status::ok()
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("label", &self.label)
            .field("rules", &self.rules.len())
            .finish()
    }
}
