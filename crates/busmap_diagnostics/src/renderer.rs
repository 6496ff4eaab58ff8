//! Human-readable rendering of diagnostics.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;
use crate::severity::Severity;
use busmap_source::SourceDb;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in the bracketed terminal format.
///
/// Produces output like:
/// ```text
/// [ERROR] R205: MBUS: range 'UART' overlaps range 'BRAM'
///   --> config_main_bus.csv:4:28
///    |
///  4 | RANGE_BASE_ADDR,0x00000000 0x00000800
///    |                            ^^^^^^^^^^ overlaps [0x00000000, 0x00000FFF]
///    = note: ...
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes on the severity tag.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Returns the severity tag, coloured when enabled.
    pub fn tag(&self, severity: Severity) -> String {
        if !self.color {
            return severity.tag().to_string();
        }
        let ansi = match severity {
            Severity::Info => "\x1b[1;36m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Error => "\x1b[1;31m",
        };
        format!("{ansi}{}\x1b[0m", severity.tag())
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = format!("{} {}: {}\n", self.tag(diag.severity), diag.code, diag.message);

        if let (Some(location), Some(file)) = (
            source_db.resolve_span(diag.primary_span),
            source_db.get_file(diag.primary_span.file),
        ) {
            out.push_str(&format!("  --> {location}\n"));

            let line_num = location.line.to_string();
            let padding = " ".repeat(line_num.len());
            let line_content = file.line_text(location.line);
            out.push_str(&format!(" {padding} |\n"));
            out.push_str(&format!(" {line_num} | {line_content}\n"));

            let span_len = diag.primary_span.len().max(1) as usize;
            let carets = "^".repeat(span_len);
            let col_padding = " ".repeat((location.col as usize).saturating_sub(1));
            let primary_msg = diag
                .labels
                .iter()
                .find(|l| l.style == LabelStyle::Primary)
                .map(|l| format!(" {}", l.message))
                .unwrap_or_default();
            out.push_str(&format!(" {padding} | {col_padding}{carets}{primary_msg}\n"));

            for label in diag
                .labels
                .iter()
                .filter(|l| l.style == LabelStyle::Secondary)
            {
                if let Some(loc) = source_db.resolve_span(label.span) {
                    out.push_str(&format!(" {padding} - {loc}: {}\n", label.message));
                }
            }
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}
