//! Property-table source management and span tracking for diagnostics.
//!
//! Every table the loader reads is held in a [`SourceDb`] so diagnostics can
//! point back at the exact row and token that caused them. A [`Span`] is a
//! byte range in one loaded file; a [`Location`] is its 1-indexed line/column.

#![warn(missing_docs)]

pub mod source_db;
pub mod span;

pub use source_db::{Location, SourceDb, SourceFile};
pub use span::{FileId, Span};
