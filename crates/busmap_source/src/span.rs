//! File identifiers and byte-offset spans.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a table loaded into the [`SourceDb`](crate::SourceDb).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Identifier used by spans that do not refer to any loaded table.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index of this `FileId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// A byte range within a loaded table. `start` is inclusive, `end` exclusive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The table this span belongs to.
    pub file: FileId,
    /// Byte offset of the first byte.
    pub start: u32,
    /// Byte offset one past the last byte.
    pub end: u32,
}

impl Span {
    /// A span with no source location (synthetic values, whole-run findings).
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a new span in `file` covering `start..end`.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Returns the smallest span covering both `self` and `other`.
    ///
    /// A dummy operand yields the other span unchanged.
    ///
    /// # Panics
    ///
    /// Panics if both spans are real and belong to different files.
    pub fn merge(self, other: Span) -> Span {
        if self.is_dummy() {
            return other;
        }
        if other.is_dummy() {
            return self;
        }
        assert_eq!(
            self.file, other.file,
            "cannot merge spans from different tables"
        );
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if this span has zero length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this is the dummy span.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_file_is_distinct() {
        assert_ne!(FileId::DUMMY, FileId::from_raw(0));
        assert_eq!(FileId::from_raw(7).as_raw(), 7);
    }

    #[test]
    fn merge_covers_both() {
        let f = FileId::from_raw(0);
        let a = Span::new(f, 5, 15);
        let b = Span::new(f, 10, 25);
        assert_eq!(a.merge(b), Span::new(f, 5, 25));
        assert_eq!(a.merge(b), b.merge(a));
    }

    #[test]
    fn merge_with_dummy_keeps_real_span() {
        let real = Span::new(FileId::from_raw(1), 3, 9);
        assert_eq!(real.merge(Span::DUMMY), real);
        assert_eq!(Span::DUMMY.merge(real), real);
    }

    #[test]
    fn len_and_empty() {
        let f = FileId::from_raw(0);
        assert_eq!(Span::new(f, 10, 20).len(), 10);
        assert!(Span::new(f, 4, 4).is_empty());
        assert!(Span::DUMMY.is_dummy());
        assert!(!Span::new(f, 0, 0).is_dummy());
    }

    #[test]
    fn serde_roundtrip() {
        let s = Span::new(FileId::from_raw(2), 10, 20);
        let json = serde_json::to_string(&s).unwrap();
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
