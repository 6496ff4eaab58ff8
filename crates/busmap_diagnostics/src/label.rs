//! Labels that annotate table spans within a diagnostic.

use busmap_source::Span;
use serde::{Deserialize, Serialize};

/// Whether a label marks the offending token or related context.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// The offending token, underlined with `^`.
    Primary,
    /// A related location, e.g. the range an overlapping range collides with.
    Secondary,
}

/// A span with an explanatory message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// The span this label annotates.
    pub span: Span,
    /// The message shown next to the underline.
    pub message: String,
    /// Primary or secondary.
    pub style: LabelStyle,
}

impl Label {
    /// Creates a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}
