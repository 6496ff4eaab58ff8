//! Errors raised while reading property tables.

use busmap_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use busmap_source::Span;
use std::path::PathBuf;

/// Errors that stop a property table from producing a record.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The first non-comment line is not `Property,Value`.
    #[error("expected header 'Property,Value', found '{found}'")]
    MissingHeader {
        /// The line found instead.
        found: String,
        /// Span of that line.
        span: Span,
    },

    /// A row has no comma, an empty name, an unterminated quote or extra cells.
    #[error("malformed row: {reason}")]
    MalformedRow {
        /// What is wrong with the row.
        reason: String,
        /// Span of the row.
        span: Span,
    },

    /// A token is not a non-negative integer.
    #[error("{property}: '{token}' is not a valid integer")]
    InvalidInteger {
        /// The property being read.
        property: String,
        /// The rejected token.
        token: String,
        /// Span of the token.
        span: Span,
    },

    /// A token is not a `0x`-prefixed 64-bit address.
    #[error("{property}: {source}")]
    InvalidAddress {
        /// The property being read.
        property: String,
        /// The underlying parse failure.
        source: busmap_common::ParseAddressError,
        /// Span of the token.
        span: Span,
    },

    /// A token is not a clock frequency.
    #[error("{property}: {source}")]
    InvalidFrequency {
        /// The property being read.
        property: String,
        /// The underlying parse failure.
        source: busmap_common::ParseFrequencyError,
        /// Span of the token.
        span: Span,
    },

    /// `XLEN` is neither 32 nor 64.
    #[error("XLEN must be 32 or 64, found '{value}'")]
    InvalidXlen {
        /// The rejected value.
        value: String,
        /// Span of the value.
        span: Span,
    },

    /// The table file name is not bound to any record in the policy.
    #[error("table '{file_name}' is not bound to the system or to any bus")]
    UnboundTable {
        /// The file name that has no binding.
        file_name: String,
    },

    /// The table could not be read.
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        /// Path of the table.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Two tables produced a record with the same name.
    #[error("record '{name}' is loaded more than once")]
    DuplicateRecord {
        /// The repeated record name.
        name: String,
        /// Origin of the second record.
        span: Span,
        /// Origin of the first record.
        first: Span,
    },
}

impl TableError {
    /// Returns the diagnostic code for this error.
    pub fn code(&self) -> DiagnosticCode {
        let number = match self {
            TableError::MissingHeader { .. } => 601,
            TableError::MalformedRow { .. } => 602,
            TableError::InvalidInteger { .. } => 603,
            TableError::InvalidAddress { .. } => 604,
            TableError::InvalidFrequency { .. } => 605,
            TableError::InvalidXlen { .. } => 606,
            TableError::UnboundTable { .. } => 607,
            TableError::Io { .. } => 608,
            TableError::DuplicateRecord { .. } => 609,
        };
        DiagnosticCode::new(Category::Table, number)
    }

    /// Returns the table span the error points at, or dummy.
    pub fn span(&self) -> Span {
        match self {
            TableError::MissingHeader { span, .. }
            | TableError::MalformedRow { span, .. }
            | TableError::InvalidInteger { span, .. }
            | TableError::InvalidAddress { span, .. }
            | TableError::InvalidFrequency { span, .. }
            | TableError::InvalidXlen { span, .. }
            | TableError::DuplicateRecord { span, .. } => *span,
            TableError::UnboundTable { .. } | TableError::Io { .. } => Span::DUMMY,
        }
    }

    /// Converts the error into an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let span = self.span();
        let diag = Diagnostic::error(self.code(), self.to_string(), span);
        match self {
            TableError::UnboundTable { .. } => diag.with_help(
                "bind the file name under [system] or [buses.<NAME>] in busmap.toml",
            ),
            TableError::InvalidAddress { .. } => diag
                .with_label(Label::primary(span, "expected 0x followed by 1 to 16 hex digits")),
            TableError::DuplicateRecord { name, first, .. } => diag
                .with_record(name.clone())
                .with_label(Label::secondary(*first, "first loaded here")),
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_table_category() {
        let err = TableError::UnboundTable {
            file_name: "config_dma_bus.csv".to_string(),
        };
        assert_eq!(err.code().to_string(), "T607");
        assert!(err.span().is_dummy());
    }

    #[test]
    fn address_error_message() {
        let err = TableError::InvalidAddress {
            property: "RANGE_BASE_ADDR".to_string(),
            source: busmap_common::parse_hex_address("0x1G").unwrap_err(),
            span: Span::DUMMY,
        };
        assert_eq!(err.code().to_string(), "T604");
        assert!(err.to_string().starts_with("RANGE_BASE_ADDR: invalid address '0x1G'"));
    }

    #[test]
    fn diagnostic_carries_help() {
        let diag = TableError::UnboundTable {
            file_name: "x.csv".to_string(),
        }
        .to_diagnostic();
        assert!(diag.severity.is_error());
        assert_eq!(diag.help.len(), 1);
    }

    #[test]
    fn duplicate_record_points_at_both() {
        let diag = TableError::DuplicateRecord {
            name: "MBUS".to_string(),
            span: Span::DUMMY,
            first: Span::DUMMY,
        }
        .to_diagnostic();
        assert_eq!(diag.code.to_string(), "T609");
        assert_eq!(diag.record.as_deref(), Some("MBUS"));
        assert_eq!(diag.labels.len(), 1);
    }
}
