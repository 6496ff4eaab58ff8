//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The class of problem a diagnostic reports, determining its code prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Sequence-length mismatches and role violations, prefixed with `S`.
    Structural,
    /// Width, alignment and overlap violations, prefixed with `R`.
    Range,
    /// Unsupported values, clock-domain and containment violations, prefixed with `E`.
    Semantic,
    /// Advisory findings, prefixed with `W`.
    Warning,
    /// Informational notes, prefixed with `I`.
    Info,
    /// Property-table loading failures, prefixed with `T`.
    Table,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Structural => 'S',
            Category::Range => 'R',
            Category::Semantic => 'E',
            Category::Warning => 'W',
            Category::Info => 'I',
            Category::Table => 'T',
        }
    }
}

/// A category prefix plus a number, displayed zero-padded (`S101`, `R205`, `T607`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Structural.prefix(), 'S');
        assert_eq!(Category::Range.prefix(), 'R');
        assert_eq!(Category::Semantic.prefix(), 'E');
        assert_eq!(Category::Warning.prefix(), 'W');
        assert_eq!(Category::Info.prefix(), 'I');
        assert_eq!(Category::Table.prefix(), 'T');
    }

    #[test]
    fn display_format() {
        assert_eq!(DiagnosticCode::new(Category::Range, 205).to_string(), "R205");
        assert_eq!(DiagnosticCode::new(Category::Warning, 3).to_string(), "W003");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Semantic, 308);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
