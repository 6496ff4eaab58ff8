//! Structured diagnostic messages with severity, codes, record context and labels.

use crate::code::DiagnosticCode;
use crate::label::Label;
use crate::severity::Severity;
use busmap_source::Span;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message tied to a configuration record and table location.
///
/// Each diagnostic includes:
/// - A severity level and unique code
/// - A primary message and, when known, the span of the offending table token
/// - The name of the record (bus or system table) it concerns
/// - Optional secondary labels, notes and help text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the violated rule.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The record this diagnostic concerns, if any.
    pub record: Option<String>,
    /// The table span where the issue was detected.
    pub primary_span: Span,
    /// Additional annotated spans providing context.
    pub labels: Vec<Label>,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
    /// Actionable suggestions (e.g., "help: ...").
    pub help: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, code: DiagnosticCode, message: String, span: Span) -> Self {
        Self {
            severity,
            code,
            message,
            record: None,
            primary_span: span,
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates a new error diagnostic with the given code, message, and span.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Error, code, message.into(), span)
    }

    /// Creates a new warning diagnostic with the given code, message, and span.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Warning, code, message.into(), span)
    }

    /// Creates a new informational diagnostic with the given code, message, and span.
    pub fn info(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Info, code, message.into(), span)
    }

    /// Sets the record this diagnostic concerns.
    pub fn with_record(mut self, record: impl Into<String>) -> Self {
        self.record = Some(record.into());
        self
    }

    /// Adds a label to this diagnostic.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}
