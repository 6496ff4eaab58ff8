//! Classified validation findings.

use busmap_common::{AddressRange, Frequency};
use busmap_diagnostics::{Category, DiagnosticCode};
use busmap_table::Property;
use std::fmt;

/// A rule violated by one record, or by a parent/child pair of records.
///
/// Each variant carries the names and numbers needed to diagnose the problem
/// without re-running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A parallel sequence does not have the length its count property declares.
    #[error("{record}: {field} has {found} entries but {count_field} is {expected}")]
    CountMismatch {
        /// The record.
        record: String,
        /// The mismatched sequence.
        field: Property,
        /// `NUM_MI` or `NUM_SI`.
        count_field: Property,
        /// The declared count.
        expected: u32,
        /// The sequence length.
        found: usize,
    },

    /// The system table selects no core.
    #[error("{record}: no core selected")]
    MissingCore {
        /// The system record.
        record: String,
    },

    /// A bus table carries a core selector.
    #[error("{record}: CORE_SELECTOR '{core}' is only allowed in the system table")]
    CoreOnBus {
        /// The bus record.
        record: String,
        /// The selected core.
        core: String,
    },

    /// A child bus mapped by a parent port declares no ranges.
    #[error("{child}: mapped by {parent} port {port} but declares no address ranges")]
    EmptyChildBus {
        /// The parent bus.
        parent: String,
        /// The parent port index.
        port: usize,
        /// The child bus.
        child: String,
    },

    /// The bus `ADDR_WIDTH` is outside `1..=64`.
    #[error("{record}: ADDR_WIDTH {addr_width} is outside 1..=64")]
    BusWidthOutOfRange {
        /// The bus record.
        record: String,
        /// The declared width.
        addr_width: u32,
    },

    /// A range is wider than the bus address.
    #[error("{record}: range '{range}' (index {index}) is {width} bits wide, more than ADDR_WIDTH {addr_width}")]
    RangeWiderThanBus {
        /// The bus record.
        record: String,
        /// The port index.
        index: usize,
        /// The range name.
        range: String,
        /// The range width.
        width: u32,
        /// The bus address width.
        addr_width: u32,
    },

    /// A range is narrower than the protocol allows.
    #[error("{record}: range '{range}' (index {index}) is {width} bits wide, below the {protocol} minimum of {minimum}")]
    BelowProtocolMinimum {
        /// The bus record.
        record: String,
        /// The port index.
        index: usize,
        /// The range name.
        range: String,
        /// The range width.
        width: u32,
        /// The bus protocol.
        protocol: String,
        /// The protocol minimum.
        minimum: u32,
    },

    /// A base address is not a multiple of its window size.
    #[error("{record}: base {base:#x} of range '{range}' (index {index}) is not aligned to its {width}-bit window")]
    Misaligned {
        /// The bus record.
        record: String,
        /// The port index.
        index: usize,
        /// The range name.
        range: String,
        /// The base address.
        base: u64,
        /// The range width.
        width: u32,
    },

    /// Two ranges of the same bus share or touch an address.
    #[error("{record}: range {range} (index {index}) overlaps {other} (index {other_index})")]
    Overlap {
        /// The bus record.
        record: String,
        /// The later port index.
        index: usize,
        /// The later range.
        range: AddressRange,
        /// The earlier port index.
        other_index: usize,
        /// The earlier range.
        other: AddressRange,
    },

    /// The selected core is not supported.
    #[error("{record}: unsupported core '{core}'")]
    UnsupportedCore {
        /// The system record.
        record: String,
        /// The selected core.
        core: String,
    },

    /// The bus protocol is missing or not AXI4/AXI4LITE/DISABLE.
    #[error("{record}: unsupported protocol '{}'", .protocol.as_deref().unwrap_or("<none>"))]
    UnsupportedProtocol {
        /// The bus record.
        record: String,
        /// The declared protocol, if any.
        protocol: Option<String>,
    },

    /// The main clock is not in the profile's frequency set.
    #[error("{record}: main clock {clock} is not supported by profile '{profile}'")]
    MainClockUnsupported {
        /// The bus record.
        record: String,
        /// The main clock.
        clock: Frequency,
        /// The active profile.
        profile: String,
        /// The profile's frequencies.
        supported: Vec<Frequency>,
    },

    /// A range clock is not in the profile's frequency set.
    #[error("{record}: clock {clock} of range '{range}' (index {index}) is not supported by profile '{profile}'")]
    RangeClockUnsupported {
        /// The bus record.
        record: String,
        /// The port index.
        index: usize,
        /// The range name.
        range: String,
        /// The range clock.
        clock: Frequency,
        /// The active profile.
        profile: String,
        /// The profile's frequencies.
        supported: Vec<Frequency>,
    },

    /// A clock owner runs at a frequency other than its fixed ones.
    #[error("{record}: clock {clock} of range '{range}' (index {index}) is not one of the {prefix} frequencies")]
    ExemptClockMismatch {
        /// The bus record.
        record: String,
        /// The port index.
        index: usize,
        /// The range name.
        range: String,
        /// The matching clock-owner prefix.
        prefix: String,
        /// The range clock.
        clock: Frequency,
        /// The owner's allowed frequencies.
        allowed: Vec<Frequency>,
    },

    /// A main-domain device is not clocked by the main clock.
    #[error("{record}: range '{range}' (index {index}) must run on the main clock {main}, found {clock}")]
    MainDomainMismatch {
        /// The bus record.
        record: String,
        /// The port index.
        index: usize,
        /// The range name.
        range: String,
        /// The range clock.
        clock: Frequency,
        /// The main clock.
        main: Frequency,
    },

    /// More than one range starts with a reserved unique prefix.
    #[error("{record}: range '{range}' (index {index}) is a second {prefix} range after '{first}' (index {first_index})")]
    DuplicateUniquePrefix {
        /// The bus record.
        record: String,
        /// The reserved prefix.
        prefix: String,
        /// The later port index.
        index: usize,
        /// The later range name.
        range: String,
        /// The earlier port index.
        first_index: usize,
        /// The earlier range name.
        first: String,
    },

    /// A child bus spans addresses outside the window its parent reserved.
    #[error("{child}: span [{span_base:#x}, {span_end:#x}] is not contained in {parent} window {window}")]
    NotContained {
        /// The parent bus.
        parent: String,
        /// The parent port index.
        port: usize,
        /// The child bus.
        child: String,
        /// The parent's window for the child.
        window: AddressRange,
        /// First address occupied by the child.
        span_base: u64,
        /// Last address occupied by the child.
        span_end: u64,
    },
}

impl ValidationError {
    /// Returns the diagnostic code for this error.
    pub fn code(&self) -> DiagnosticCode {
        use ValidationError::*;
        let (category, number) = match self {
            CountMismatch { .. } => (Category::Structural, 101),
            MissingCore { .. } => (Category::Structural, 102),
            CoreOnBus { .. } => (Category::Structural, 103),
            EmptyChildBus { .. } => (Category::Structural, 104),
            BusWidthOutOfRange { .. } => (Category::Range, 201),
            RangeWiderThanBus { .. } => (Category::Range, 202),
            BelowProtocolMinimum { .. } => (Category::Range, 203),
            Misaligned { .. } => (Category::Range, 204),
            Overlap { .. } => (Category::Range, 205),
            UnsupportedCore { .. } => (Category::Semantic, 301),
            UnsupportedProtocol { .. } => (Category::Semantic, 302),
            MainClockUnsupported { .. } => (Category::Semantic, 303),
            RangeClockUnsupported { .. } => (Category::Semantic, 304),
            ExemptClockMismatch { .. } => (Category::Semantic, 305),
            MainDomainMismatch { .. } => (Category::Semantic, 306),
            DuplicateUniquePrefix { .. } => (Category::Semantic, 307),
            NotContained { .. } => (Category::Semantic, 308),
        };
        DiagnosticCode::new(category, number)
    }

    /// Returns the record the error is reported against.
    ///
    /// Parent/child errors are reported against the child bus.
    pub fn record(&self) -> &str {
        use ValidationError::*;
        match self {
            CountMismatch { record, .. }
            | MissingCore { record }
            | CoreOnBus { record, .. }
            | BusWidthOutOfRange { record, .. }
            | RangeWiderThanBus { record, .. }
            | BelowProtocolMinimum { record, .. }
            | Misaligned { record, .. }
            | Overlap { record, .. }
            | UnsupportedCore { record, .. }
            | UnsupportedProtocol { record, .. }
            | MainClockUnsupported { record, .. }
            | RangeClockUnsupported { record, .. }
            | ExemptClockMismatch { record, .. }
            | MainDomainMismatch { record, .. }
            | DuplicateUniquePrefix { record, .. } => record,
            EmptyChildBus { child, .. } | NotContained { child, .. } => child,
        }
    }

    /// Returns `true` for structural errors, which stop a record in every mode.
    pub fn is_structural(&self) -> bool {
        self.code().category == Category::Structural
    }
}

/// A finding that is reported but does not fail the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A child bus's first range does not start at its parent port's base.
    ChildBaseMismatch {
        /// The parent bus.
        parent: String,
        /// The parent port index.
        port: usize,
        /// The child bus.
        child: String,
        /// Base of the parent's window.
        port_base: u64,
        /// Base of the child's first range.
        child_base: u64,
    },
    /// A mock bus whose width, overlap and clock checks are skipped.
    DisabledBus {
        /// The bus record.
        record: String,
    },
}

impl ValidationWarning {
    /// Returns the diagnostic code for this finding.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            ValidationWarning::ChildBaseMismatch { .. } => DiagnosticCode::new(Category::Warning, 401),
            ValidationWarning::DisabledBus { .. } => DiagnosticCode::new(Category::Info, 501),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::ChildBaseMismatch {
                parent,
                port,
                child,
                port_base,
                child_base,
            } => write!(
                f,
                "{child}: first range starts at {child_base:#x}, but {parent} port {port} starts at {port_base:#x}"
            ),
            ValidationWarning::DisabledBus { record } => {
                write!(f, "{record}: protocol DISABLE, width, overlap and clock checks skipped")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_by_category() {
        let err = ValidationError::MissingCore {
            record: "SYS".to_string(),
        };
        assert_eq!(err.code().to_string(), "S102");
        assert!(err.is_structural());

        let err = ValidationError::Misaligned {
            record: "MBUS".to_string(),
            index: 1,
            range: "UART".to_string(),
            base: 0x800,
            width: 12,
        };
        assert_eq!(err.code().to_string(), "R204");
        assert!(!err.is_structural());
        assert_eq!(
            err.to_string(),
            "MBUS: base 0x800 of range 'UART' (index 1) is not aligned to its 12-bit window"
        );
    }

    #[test]
    fn containment_reported_against_child() {
        let err = ValidationError::NotContained {
            parent: "MBUS".to_string(),
            port: 3,
            child: "PBUS".to_string(),
            window: AddressRange::new("PBUS", 0x4000_0000, 16),
            span_base: 0x4000_0000,
            span_end: 0x4001_0000,
        };
        assert_eq!(err.record(), "PBUS");
        assert_eq!(err.code().to_string(), "E308");
        assert_eq!(
            err.to_string(),
            "PBUS: span [0x40000000, 0x40010000] is not contained in MBUS window PBUS [0x40000000, 0x4000ffff]"
        );
    }

    #[test]
    fn count_mismatch_names_both_fields() {
        let err = ValidationError::CountMismatch {
            record: "PBUS".to_string(),
            field: Property::BaseAddr,
            count_field: Property::NumMi,
            expected: 3,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "PBUS: RANGE_BASE_ADDR has 2 entries but NUM_MI is 3"
        );
    }

    #[test]
    fn missing_protocol_message() {
        let err = ValidationError::UnsupportedProtocol {
            record: "HBUS".to_string(),
            protocol: None,
        };
        assert_eq!(err.to_string(), "HBUS: unsupported protocol '<none>'");
    }

    #[test]
    fn warning_codes() {
        let w = ValidationWarning::DisabledBus {
            record: "HBUS".to_string(),
        };
        assert_eq!(w.code().to_string(), "I501");
        let w = ValidationWarning::ChildBaseMismatch {
            parent: "MBUS".to_string(),
            port: 2,
            child: "PBUS".to_string(),
            port_base: 0x1000_0000,
            child_base: 0x1000_1000,
        };
        assert_eq!(w.code().to_string(), "W401");
        assert!(w.to_string().contains("0x10001000"));
    }
}
