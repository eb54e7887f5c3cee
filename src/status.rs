//! Validation status reported by blocks to their host page

use std::fmt;

/// Severity of a [`Status`], ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Ok,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Severity plus a user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub severity: Severity,
    pub message: String,
}

impl Status {
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.severity == Severity::Ok
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The most severe of `statuses`; the first one wins a tie
    ///
    /// Returns OK for an empty iterator.
    pub fn most_severe<'a>(statuses: impl IntoIterator<Item = &'a Status>) -> Status {
        let mut worst: Option<&Status> = None;
        for status in statuses {
            if worst.is_none_or(|w| status.severity > w.severity) {
                worst = Some(status);
            }
        }
        worst.cloned().unwrap_or_default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.severity)
        } else {
            write!(f, "{}: {}", self.severity, self.message)
        }
    }
}

/// Receives status updates from a configuration block
pub trait StatusListener {
    fn status_changed(&mut self, status: &Status);
}

impl<F> StatusListener for F
where
    F: FnMut(&Status),
{
    fn status_changed(&mut self, status: &Status) {
        self(status);
    }
}
