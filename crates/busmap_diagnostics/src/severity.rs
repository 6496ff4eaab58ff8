//! Diagnostic severity levels ordered from least to most severe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity of a diagnostic. Only [`Severity::Error`] fails a run.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Progress or context that needs no action.
    Info,
    /// A suspicious configuration that does not fail the check.
    Warning,
    /// A violated rule; the configuration is rejected.
    Error,
}

impl Severity {
    /// Returns `true` if this severity is [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    /// Returns the bracketed tag printed in front of diagnostics, e.g. `[ERROR]`.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Info => "[INFO]",
            Severity::Warning => "[WARNING]",
            Severity::Error => "[ERROR]",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}
