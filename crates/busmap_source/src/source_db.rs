//! Loaded property tables with line indexing for diagnostic rendering.

use crate::span::{FileId, Span};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// A property table loaded into the session.
///
/// Line-start offsets are computed once so spans resolve to line/column
/// coordinates with a binary search.
pub struct SourceFile {
    /// The identifier of this table within its [`SourceDb`].
    pub id: FileId,
    /// The path the table was read from (or a synthetic name for in-memory tables).
    pub path: PathBuf,
    /// The full text of the table.
    pub content: String,
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Creates a new `SourceFile`, indexing its line starts.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let line_starts = compute_line_starts(&content);
        Self {
            id,
            path,
            content,
            line_starts,
        }
    }

    /// Returns the file name component of the path, if it is valid UTF-8.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = (line_idx as u32) + 1;
        let col = byte_offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Returns the text of the 1-indexed `line`, without its line terminator.
    pub fn line_text(&self, line: u32) -> &str {
        let idx = (line as usize).saturating_sub(1);
        let Some(&start) = self.line_starts.get(idx) else {
            return "";
        };
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(self.content.len(), |&next| next as usize);
        self.content[start as usize..end].trim_end_matches(['\n', '\r'])
    }

    /// Returns the text between two byte offsets.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        &self.content[start as usize..end as usize]
    }
}

fn compute_line_starts(content: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}

/// A span resolved to a 1-indexed line and column for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Path of the table.
    pub file_path: PathBuf,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub col: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_path.display(), self.line, self.col)
    }
}

/// Owns the text of every table read during a run.
#[derive(Default)]
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Reads a table from disk and returns its [`FileId`].
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_source(path, content))
    }

    /// Adds a table held in memory. `name` is shown as the path in diagnostics.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), content));
        id
    }

    /// Returns the table for `id`, or `None` for [`FileId::DUMMY`] and unknown ids.
    pub fn get_file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.as_raw() as usize)
    }

    /// Resolves the start of `span` to a [`Location`].
    pub fn resolve_span(&self, span: Span) -> Option<Location> {
        if span.is_dummy() {
            return None;
        }
        let file = self.get_file(span.file)?;
        let (line, col) = file.line_col(span.start);
        Some(Location {
            file_path: file.path.clone(),
            line,
            col,
        })
    }

    /// Returns the text covered by `span`, or `""` when it has no source.
    pub fn snippet(&self, span: Span) -> &str {
        self.get_file(span.file)
            .map_or("", |file| file.snippet(span.start, span.end))
    }

    /// Returns the number of loaded tables.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no table has been loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
