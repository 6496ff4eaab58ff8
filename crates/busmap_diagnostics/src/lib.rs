//! Classified diagnostics for configuration checking.
//!
//! A [`Diagnostic`] carries a [`Severity`], a [`DiagnosticCode`] whose prefix
//! names the error class (structural, range, semantic, table), the record it
//! concerns, and labels pointing into the property tables. The
//! [`DiagnosticSink`] accumulates them during a run and the
//! [`TerminalRenderer`] prints them as `[ERROR]`/`[WARNING]`/`[INFO]` blocks.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use label::{Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
