//! Scoped construction of a [`ConfigRecord`] from property rows.

use crate::csv::PropertyRow;
use crate::dispatch::{dispatch, Dispatch};
use crate::error::TableError;
use crate::record::{ConfigRecord, PropertySpans, RecordKind};
use busmap_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use busmap_source::Span;
use std::collections::HashMap;

/// Owns a record while its table is being read.
///
/// Rows are applied in file order; [`finish`](Self::finish) hands out the
/// completed record together with the warnings raised along the way.
pub struct RecordBuilder {
    pub(crate) record: ConfigRecord,
    seen: HashMap<String, Span>,
    warnings: Vec<Diagnostic>,
}

impl RecordBuilder {
    /// Starts a record with the table defaults. `origin` is the table header span.
    pub fn new(name: impl Into<String>, kind: RecordKind, origin: Span) -> Self {
        let mut record = ConfigRecord::new(name, kind);
        record.origin = origin;
        Self {
            record,
            seen: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns the record under construction.
    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    /// Applies one row through the dispatch table.
    pub fn apply(&mut self, row: &PropertyRow) -> Result<(), TableError> {
        match dispatch(&row.name) {
            Dispatch::Handler(handler) => {
                log::trace!("{}: {} = '{}'", self.record.name, handler.name, row.value);
                self.check_duplicate(handler.property.as_str(), row);
                (handler.apply)(self, row)?;
                self.record.set_spans(
                    handler.property,
                    PropertySpans {
                        row: row.row_span,
                        value: row.value_span,
                        tokens: row.token_spans(),
                    },
                );
            }
            Dispatch::Retained => {
                log::trace!("{}: retained {} = '{}'", self.record.name, row.name, row.value);
                self.check_duplicate(&row.name, row);
                self.record.extra.insert(row.name.clone(), row.value.clone());
            }
            Dispatch::Unsupported => {
                let diag = Diagnostic::warning(
                    DiagnosticCode::new(Category::Warning, 402),
                    format!("unsupported property '{}' ignored", row.name),
                    row.name_span,
                );
                self.warn(diag);
            }
        }
        Ok(())
    }

    /// Queues a warning, attributing it to this record.
    pub fn warn(&mut self, diag: Diagnostic) {
        let name = self.record.name.clone();
        self.warnings.push(diag.with_record(name));
    }

    /// Completes the record.
    pub fn finish(self) -> (ConfigRecord, Vec<Diagnostic>) {
        (self.record, self.warnings)
    }

    fn check_duplicate(&mut self, key: &str, row: &PropertyRow) {
        if let Some(first) = self.seen.insert(key.to_string(), row.name_span) {
            let diag = Diagnostic::warning(
                DiagnosticCode::new(Category::Warning, 403),
                format!("property '{key}' is declared more than once; the last value is used"),
                row.name_span,
            )
            .with_label(Label::secondary(first, "previously declared here"));
            self.warn(diag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::read_rows;
    use crate::record::{Protocol, Xlen};
    use busmap_common::Frequency;
    use busmap_source::FileId;

    fn build(content: &str) -> Result<(ConfigRecord, Vec<Diagnostic>), TableError> {
        let (origin, rows) = read_rows(FileId::from_raw(0), content)?;
        let mut builder = RecordBuilder::new("MBUS", RecordKind::Bus, origin);
        for row in &rows {
            builder.apply(row)?;
        }
        Ok(builder.finish())
    }

    #[test]
    fn builds_bus_record() {
        let (record, warnings) = build(
            "Property,Value\n\
             PROTOCOL,AXI4\n\
             NUM_MI,2\n\
             NUM_SI,1\n\
             MASTER_NAMES,CORE\n\
             RANGE_NAMES,BRAM UART\n\
             RANGE_BASE_ADDR,0x00000000 0x00001000\n\
             RANGE_ADDR_WIDTH,12 12\n\
             MAIN_CLOCK_DOMAIN,50\n\
             RANGE_CLOCK_DOMAINS,50 20\n",
        )
        .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(record.protocol, Some(Protocol::Axi4));
        assert_eq!(record.num_mi, 2);
        assert_eq!(record.num_si, 1);
        assert_eq!(record.master_names, vec!["CORE"]);
        assert_eq!(record.base_addr, vec![0, 0x1000]);
        assert_eq!(record.range_addr_width, vec![12, 12]);
        assert_eq!(record.clock_domain_main, Frequency::from_mhz(50));
        assert_eq!(record.range_clock_domains[1], Frequency::from_mhz(20));
    }

    #[test]
    fn aliases_fill_the_same_field() {
        let (record, _) = build(
            "Property,Value\nBASE_ADDR,0x1000\nCLOCK_DOMAIN_MAIN,20MHz\n",
        )
        .unwrap();
        assert_eq!(record.base_addr, vec![0x1000]);
        assert_eq!(record.clock_domain_main, Frequency::from_mhz(20));
    }

    #[test]
    fn defaults_survive_empty_values() {
        let (record, _) = build("Property,Value\nADDR_WIDTH,\nXLEN,\nMAIN_CLOCK_DOMAIN,\n").unwrap();
        assert_eq!(record.addr_width, 32);
        assert_eq!(record.xlen, Xlen::X32);
        assert_eq!(record.clock_domain_main, Frequency::from_mhz(100));
        assert!(record.declares(crate::Property::AddrWidth));
    }

    #[test]
    fn tuning_properties_are_kept_verbatim() {
        let (record, warnings) = build("Property,Value\nID_WIDTH,4\nAWUSER_WIDTH,0\n").unwrap();
        assert!(warnings.is_empty());
        assert_eq!(record.extra["ID_WIDTH"], "4");
        assert_eq!(record.extra["AWUSER_WIDTH"], "0");
    }

    #[test]
    fn unsupported_property_warns() {
        let (_, warnings) = build("Property,Value\nLINKER_ORIGIN,0x0\n").unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code.to_string(), "W402");
        assert_eq!(warnings[0].record.as_deref(), Some("MBUS"));
    }

    #[test]
    fn duplicate_keeps_last_value() {
        let (record, warnings) =
            build("Property,Value\nNUM_MI,1\nNUM_MI,3\n").unwrap();
        assert_eq!(record.num_mi, 3);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code.to_string(), "W403");
        assert_eq!(warnings[0].labels.len(), 1);
    }

    #[test]
    fn duplicate_through_alias() {
        let (_, warnings) =
            build("Property,Value\nRANGE_BASE_ADDR,0x0\nBASE_ADDR,0x1000\n").unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("RANGE_BASE_ADDR"));
    }

    #[test]
    fn interface_count_out_of_range_keeps_default() {
        let (record, warnings) = build("Property,Value\nNUM_MI,17\nNUM_SI,-1\n").unwrap();
        assert_eq!(record.num_mi, 0);
        assert_eq!(record.num_si, 0);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.code.to_string() == "W404"));
    }

    #[test]
    fn bad_tokens_error_with_span() {
        let content = "Property,Value\nRANGE_BASE_ADDR,0x0 0xZZ\n";
        let err = build(content).unwrap_err();
        assert_eq!(err.code().to_string(), "T604");
        let span = err.span();
        assert_eq!(&content[span.start as usize..span.end as usize], "0xZZ");

        let err = build("Property,Value\nRANGE_ADDR_WIDTH,12 twelve\n").unwrap_err();
        assert_eq!(err.code().to_string(), "T603");
        let err = build("Property,Value\nRANGE_CLOCK_DOMAINS,fast\n").unwrap_err();
        assert_eq!(err.code().to_string(), "T605");
        let err = build("Property,Value\nXLEN,128\n").unwrap_err();
        assert_eq!(err.code().to_string(), "T606");
    }

    #[test]
    fn unknown_protocol_is_retained() {
        let (record, _) = build("Property,Value\nPROTOCOL,AXI3\n").unwrap();
        assert_eq!(record.protocol, Some(Protocol::Other("AXI3".to_string())));
    }

    #[test]
    fn address_without_prefix_is_rejected() {
        let err = build("Property,Value\nRANGE_BASE_ADDR,1000\n").unwrap_err();
        assert_eq!(err.code().to_string(), "T604");
        let err = build("Property,Value\nRANGE_BASE_ADDR,0x00000000000000000\n").unwrap_err();
        assert_eq!(err.code().to_string(), "T604");
    }
}
