//! Conversion of validation findings into source-anchored diagnostics.

use crate::error::{ValidationError, ValidationWarning};
use busmap_common::{AddressRange, Frequency};
use busmap_diagnostics::{Diagnostic, Label};
use busmap_source::Span;
use busmap_table::{ConfigRecord, Property, RecordSet};

/// Locates a span in the named record, or dummy if it is not in the set.
fn locate(records: &RecordSet, name: &str, f: impl FnOnce(&ConfigRecord) -> Span) -> Span {
    records.get(name).map_or(Span::DUMMY, f)
}

fn list(freqs: &[Frequency]) -> String {
    freqs
        .iter()
        .map(Frequency::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the error diagnostic for `err`, pointing at the offending table cells.
pub fn error_diagnostic(err: &ValidationError, records: &RecordSet) -> Diagnostic {
    use ValidationError::*;

    let record = err.record();
    let at = |f: &dyn Fn(&ConfigRecord) -> Span| locate(records, record, f);
    let token = |prop: Property, i: usize| at(&|r: &ConfigRecord| r.token_span(prop, i));
    let value = |prop: Property| at(&|r: &ConfigRecord| r.span_of(prop));

    let (span, diag) = match err {
        CountMismatch {
            field,
            count_field,
            expected,
            ..
        } => {
            let field_span = at(&|r: &ConfigRecord| {
                if r.declares(*field) {
                    r.span_of(*field)
                } else {
                    r.span_of(*count_field)
                }
            });
            let diag = Diagnostic::error(err.code(), err.to_string(), field_span)
                .with_label(Label::secondary(value(*count_field), "count declared here"))
                .with_help(format!("list exactly {expected} entries in {field}"));
            (field_span, diag)
        }
        MissingCore { .. } => {
            let span = at(&|r: &ConfigRecord| r.origin);
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_help("add a CORE_SELECTOR row to the system table");
            (span, diag)
        }
        CoreOnBus { .. } => {
            let span = value(Property::CoreSelector);
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_help("move CORE_SELECTOR to the system table");
            (span, diag)
        }
        EmptyChildBus { parent, port, .. } => {
            let span = at(&|r: &ConfigRecord| r.origin);
            let mapped = locate(records, parent, |r| r.token_span(Property::RangeNames, *port));
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_label(Label::secondary(mapped, "mapped as a child bus here"));
            (span, diag)
        }
        BusWidthOutOfRange { .. } => {
            let span = value(Property::AddrWidth);
            (span, Diagnostic::error(err.code(), err.to_string(), span))
        }
        RangeWiderThanBus { index, .. } => {
            let span = token(Property::RangeAddrWidth, *index);
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_label(Label::secondary(value(Property::AddrWidth), "bus width declared here"));
            (span, diag)
        }
        BelowProtocolMinimum { index, .. } => {
            let span = token(Property::RangeAddrWidth, *index);
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_label(Label::secondary(value(Property::Protocol), "protocol declared here"));
            (span, diag)
        }
        Misaligned {
            base, width, index, ..
        } => {
            let span = token(Property::BaseAddr, *index);
            let window = AddressRange::new("", *base, *width);
            let aligned_down = base & !busmap_common::window_mask(*width);
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_label(Label::primary(span, "not a multiple of the window size"))
                .with_note(format!("a {width}-bit window is {:#x} bytes", window.size()))
                .with_help(format!("use a base such as {aligned_down:#x}"));
            (span, diag)
        }
        Overlap {
            index,
            other_index,
            range,
            other,
            ..
        } => {
            let span = token(Property::BaseAddr, *index);
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_label(Label::primary(span, format!("ends at {:#x}", range.end)))
                .with_label(Label::secondary(
                    token(Property::BaseAddr, *other_index),
                    format!("{} spans [{:#x}, {:#x}]", other.name, other.base, other.end),
                ))
                .with_note("ranges must be separated by at least one address");
            (span, diag)
        }
        UnsupportedCore { .. } => {
            let span = value(Property::CoreSelector);
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_help("supported cores are listed under [system] in busmap.toml");
            (span, diag)
        }
        UnsupportedProtocol { protocol, .. } => {
            let span = match protocol {
                Some(_) => value(Property::Protocol),
                None => at(&|r: &ConfigRecord| r.origin),
            };
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_help("expected AXI4, AXI4LITE or DISABLE");
            (span, diag)
        }
        MainClockUnsupported { supported, .. } => {
            let span = value(Property::MainClockDomain);
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_note(format!("supported: {}", list(supported)));
            (span, diag)
        }
        RangeClockUnsupported {
            index, supported, ..
        } => {
            let span = token(Property::RangeClockDomains, *index);
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_note(format!("supported: {}", list(supported)));
            (span, diag)
        }
        ExemptClockMismatch {
            index, allowed, prefix, ..
        } => {
            let span = token(Property::RangeClockDomains, *index);
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_note(format!("{prefix} owns its clock and runs at {}", list(allowed)));
            (span, diag)
        }
        MainDomainMismatch { index, .. } => {
            let span = token(Property::RangeClockDomains, *index);
            let diag = Diagnostic::error(err.code(), err.to_string(), span).with_label(
                Label::secondary(value(Property::MainClockDomain), "main clock declared here"),
            );
            (span, diag)
        }
        DuplicateUniquePrefix {
            index, first_index, ..
        } => {
            let span = token(Property::RangeNames, *index);
            let diag = Diagnostic::error(err.code(), err.to_string(), span).with_label(
                Label::secondary(token(Property::RangeNames, *first_index), "first declared here"),
            );
            (span, diag)
        }
        NotContained {
            parent,
            port,
            window,
            ..
        } => {
            let span = value(Property::BaseAddr);
            let reserved = locate(records, parent, |r| r.token_span(Property::BaseAddr, *port));
            let diag = Diagnostic::error(err.code(), err.to_string(), span)
                .with_label(Label::secondary(
                    reserved,
                    format!("window [{:#x}, {:#x}] reserved here", window.base, window.end),
                ))
                .with_note("a child bus must lie entirely within its parent's window");
            (span, diag)
        }
    };
    log::trace!("{} at {:?}", err.code(), span);
    diag.with_record(record)
}

/// Builds the diagnostic for a finding that does not fail the check.
pub fn warning_diagnostic(warning: &ValidationWarning, records: &RecordSet) -> Diagnostic {
    match warning {
        ValidationWarning::ChildBaseMismatch {
            parent, port, child, ..
        } => {
            let span = locate(records, child, |r| r.token_span(Property::BaseAddr, 0));
            let port_span = locate(records, parent, |r| r.token_span(Property::BaseAddr, *port));
            Diagnostic::warning(warning.code(), warning.to_string(), span)
                .with_label(Label::secondary(port_span, "parent port starts here"))
                .with_record(child.clone())
        }
        ValidationWarning::DisabledBus { record } => {
            let span = locate(records, record, |r| r.span_of(Property::Protocol));
            Diagnostic::info(warning.code(), warning.to_string(), span).with_record(record.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busmap_config::{builtin_config, resolve_profile};
    use busmap_diagnostics::Severity;
    use busmap_source::SourceDb;
    use busmap_table::load_table_from_str;

    fn load(db: &mut SourceDb, file: &str, content: &str) -> ConfigRecord {
        let policy = resolve_profile(&builtin_config(), "embedded").unwrap();
        load_table_from_str(file, content, &policy, db).unwrap().record
    }

    #[test]
    fn overlap_points_at_both_bases() {
        let mut db = SourceDb::new();
        let content = "Property,Value\n\
                       PROTOCOL,AXI4LITE\n\
                       RANGE_NAMES,UART GPIO\n\
                       RANGE_BASE_ADDR,0x1000 0x1800\n\
                       RANGE_ADDR_WIDTH,12 11\n";
        let record = load(&mut db, "config_peripheral_bus.csv", content);
        let records = RecordSet::from_records([record]).unwrap();
        let err = ValidationError::Overlap {
            record: "PBUS".to_string(),
            index: 1,
            range: AddressRange::new("GPIO", 0x1800, 11),
            other_index: 0,
            other: AddressRange::new("UART", 0x1000, 12),
        };
        let diag = error_diagnostic(&err, &records);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.record.as_deref(), Some("PBUS"));
        assert_eq!(db.snippet(diag.primary_span), "0x1800");
        let secondary = diag.labels.iter().find(|l| l.message.starts_with("UART")).unwrap();
        assert_eq!(db.snippet(secondary.span), "0x1000");
    }

    #[test]
    fn misaligned_suggests_base() {
        let err = ValidationError::Misaligned {
            record: "PBUS".to_string(),
            index: 0,
            range: "UART".to_string(),
            base: 0x1100,
            width: 12,
        };
        let diag = error_diagnostic(&err, &RecordSet::new());
        assert!(diag.primary_span.is_dummy());
        assert_eq!(diag.help, vec!["use a base such as 0x1000"]);
        assert_eq!(diag.notes, vec!["a 12-bit window is 0x1000 bytes"]);
    }

    #[test]
    fn containment_labels_parent_window() {
        let mut db = SourceDb::new();
        let mbus = load(
            &mut db,
            "config_main_bus.csv",
            "Property,Value\nRANGE_NAMES,BRAM PBUS\nRANGE_BASE_ADDR,0x0 0x40000000\n",
        );
        let pbus = load(
            &mut db,
            "config_peripheral_bus.csv",
            "Property,Value\nRANGE_BASE_ADDR,0x40000000 0x40010000\n",
        );
        let records = RecordSet::from_records([mbus, pbus]).unwrap();
        let err = ValidationError::NotContained {
            parent: "MBUS".to_string(),
            port: 1,
            child: "PBUS".to_string(),
            window: AddressRange::new("PBUS", 0x4000_0000, 16),
            span_base: 0x4000_0000,
            span_end: 0x4001_0000,
        };
        let diag = error_diagnostic(&err, &records);
        assert_eq!(diag.record.as_deref(), Some("PBUS"));
        assert_eq!(db.snippet(diag.primary_span), "0x40000000 0x40010000");
        assert_eq!(db.snippet(diag.labels[0].span), "0x40000000");
        assert_ne!(diag.labels[0].span.file, diag.primary_span.file);
    }

    #[test]
    fn disabled_bus_is_info() {
        let mut db = SourceDb::new();
        let hbus = load(&mut db, "config_highperformance_bus.csv", "Property,Value\nPROTOCOL,DISABLE\n");
        let records = RecordSet::from_records([hbus]).unwrap();
        let w = ValidationWarning::DisabledBus {
            record: "HBUS".to_string(),
        };
        let diag = warning_diagnostic(&w, &records);
        assert_eq!(diag.severity, Severity::Info);
        assert_eq!(diag.code.to_string(), "I501");
        assert_eq!(db.snippet(diag.primary_span), "DISABLE");
    }

    #[test]
    fn count_mismatch_falls_back_to_count() {
        let mut db = SourceDb::new();
        let pbus = load(&mut db, "config_peripheral_bus.csv", "Property,Value\nNUM_MI,2\n");
        let records = RecordSet::from_records([pbus]).unwrap();
        let err = ValidationError::CountMismatch {
            record: "PBUS".to_string(),
            field: Property::RangeNames,
            count_field: Property::NumMi,
            expected: 2,
            found: 0,
        };
        let diag = error_diagnostic(&err, &records);
        assert_eq!(db.snippet(diag.primary_span), "2");
        assert_eq!(diag.help, vec!["list exactly 2 entries in RANGE_NAMES"]);
    }
}
