//! Static dispatch from property names to typed handlers.
//!
//! Every interpreted property has one canonical entry in [`HANDLERS`]; field-name
//! aliases get their own entry pointing at the same [`Property`]. Crossbar
//! tuning properties the engine does not interpret are retained verbatim.
//! Anything else is unsupported.

use crate::builder::RecordBuilder;
use crate::csv::{PropertyRow, Token};
use crate::error::TableError;
use crate::record::{Property, Protocol, Xlen};
use busmap_common::{parse_hex_address, Frequency};
use busmap_diagnostics::{Category, Diagnostic, DiagnosticCode};
use busmap_source::Span;

/// Largest `NUM_MI`/`NUM_SI` a crossbar supports.
const MAX_INTERFACES: i64 = 16;

/// A handler that parses one row into the record under construction.
pub type Handler = fn(&mut RecordBuilder, &PropertyRow) -> Result<(), TableError>;

/// One entry of the dispatch table.
pub struct PropertyHandler {
    /// The property name as written in tables.
    pub name: &'static str,
    /// The record field the handler fills.
    pub property: Property,
    /// The handler.
    pub apply: Handler,
}

/// How a property name is treated.
pub enum Dispatch {
    /// An interpreted property.
    Handler(&'static PropertyHandler),
    /// A tuning property kept verbatim in [`ConfigRecord::extra`](crate::ConfigRecord::extra).
    Retained,
    /// An unknown property, ignored with a warning.
    Unsupported,
}

#[rustfmt::skip]
static HANDLERS: &[PropertyHandler] = &[
    PropertyHandler { name: "PROTOCOL", property: Property::Protocol, apply: protocol },
    PropertyHandler { name: "ADDR_WIDTH", property: Property::AddrWidth, apply: addr_width },
    PropertyHandler { name: "DATA_WIDTH", property: Property::DataWidth, apply: data_width },
    PropertyHandler { name: "NUM_MI", property: Property::NumMi, apply: num_mi },
    PropertyHandler { name: "NUM_SI", property: Property::NumSi, apply: num_si },
    PropertyHandler { name: "MASTER_NAMES", property: Property::MasterNames, apply: master_names },
    PropertyHandler { name: "RANGE_NAMES", property: Property::RangeNames, apply: range_names },
    PropertyHandler { name: "RANGE_BASE_ADDR", property: Property::BaseAddr, apply: base_addr },
    PropertyHandler { name: "BASE_ADDR", property: Property::BaseAddr, apply: base_addr },
    PropertyHandler { name: "RANGE_ADDR_WIDTH", property: Property::RangeAddrWidth, apply: range_addr_width },
    PropertyHandler { name: "MAIN_CLOCK_DOMAIN", property: Property::MainClockDomain, apply: main_clock },
    PropertyHandler { name: "CLOCK_DOMAIN_MAIN", property: Property::MainClockDomain, apply: main_clock },
    PropertyHandler { name: "RANGE_CLOCK_DOMAINS", property: Property::RangeClockDomains, apply: range_clocks },
    PropertyHandler { name: "CORE_SELECTOR", property: Property::CoreSelector, apply: core_selector },
    PropertyHandler { name: "XLEN", property: Property::Xlen, apply: xlen },
];

static RETAINED: &[&str] = &[
    "ID_WIDTH",
    "CONNECTIVITY_MODE",
    "STRATEGY",
    "R_REGISTER",
    "ADDR_RANGES",
    "SI_READ_ACCEPTANCE",
    "SI_WRITE_ACCEPTANCE",
    "MI_READ_ISSUING",
    "MI_WRITE_ISSUING",
    "READ_CONNECTIVITY",
    "WRITE_CONNECTIVITY",
    "Slave_Priority",
    "SECURE",
    "BASE_ID",
    "THREAD_ID_WIDTH",
    "SINGLE_THREAD",
    "PHYSICAL_ADDR_WIDTH",
    "VIO_RESETN_DEFAULT",
];

/// Resolves a property name.
pub fn dispatch(name: &str) -> Dispatch {
    if let Some(handler) = HANDLERS.iter().find(|h| h.name == name) {
        return Dispatch::Handler(handler);
    }
    if RETAINED.contains(&name) || name.ends_with("USER_WIDTH") {
        return Dispatch::Retained;
    }
    Dispatch::Unsupported
}

fn protocol(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    if !row.value.is_empty() {
        b.record.protocol = Some(Protocol::parse(&row.value));
    }
    Ok(())
}

fn addr_width(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    if let Some(v) = scalar_u32(row)? {
        b.record.addr_width = v;
    }
    Ok(())
}

fn data_width(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    if let Some(v) = scalar_u32(row)? {
        b.record.data_width = v;
    }
    Ok(())
}

fn num_mi(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    if let Some(v) = interface_count(b, row)? {
        b.record.num_mi = v;
    }
    Ok(())
}

fn num_si(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    if let Some(v) = interface_count(b, row)? {
        b.record.num_si = v;
    }
    Ok(())
}

fn master_names(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    b.record.master_names = row.token_texts().map(str::to_string).collect();
    Ok(())
}

fn range_names(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    b.record.range_names = row.token_texts().map(str::to_string).collect();
    Ok(())
}

fn base_addr(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    b.record.base_addr = row
        .tokens
        .iter()
        .map(|t| {
            parse_hex_address(&t.text).map_err(|source| TableError::InvalidAddress {
                property: row.name.clone(),
                source,
                span: t.span,
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(())
}

fn range_addr_width(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    b.record.range_addr_width = row
        .tokens
        .iter()
        .map(|t| parse_u32(&row.name, &t.text, t.span))
        .collect::<Result<_, _>>()?;
    Ok(())
}

fn main_clock(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    if !row.value.is_empty() {
        b.record.clock_domain_main = parse_frequency(&row.name, &row.value, row.value_span)?;
    }
    Ok(())
}

fn range_clocks(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    b.record.range_clock_domains = row
        .tokens
        .iter()
        .map(|t: &Token| parse_frequency(&row.name, &t.text, t.span))
        .collect::<Result<_, _>>()?;
    Ok(())
}

fn core_selector(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    b.record.core_selector = (!row.value.is_empty()).then(|| row.value.clone());
    Ok(())
}

fn xlen(b: &mut RecordBuilder, row: &PropertyRow) -> Result<(), TableError> {
    b.record.xlen = match row.value.as_str() {
        "" => return Ok(()),
        "32" => Xlen::X32,
        "64" => Xlen::X64,
        other => {
            return Err(TableError::InvalidXlen {
                value: other.to_string(),
                span: row.value_span,
            })
        }
    };
    Ok(())
}

fn scalar_u32(row: &PropertyRow) -> Result<Option<u32>, TableError> {
    if row.value.is_empty() {
        return Ok(None);
    }
    parse_u32(&row.name, &row.value, row.value_span).map(Some)
}

/// Parses `NUM_MI`/`NUM_SI`. Values outside `0..=16` keep the default with a warning.
fn interface_count(b: &mut RecordBuilder, row: &PropertyRow) -> Result<Option<u32>, TableError> {
    if row.value.is_empty() {
        return Ok(None);
    }
    let value: i64 = row
        .value
        .parse()
        .map_err(|_| invalid_integer(&row.name, &row.value, row.value_span))?;
    if !(0..=MAX_INTERFACES).contains(&value) {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 404),
            format!(
                "{} value {value} is outside 0..={MAX_INTERFACES}; keeping the default",
                row.name
            ),
            row.value_span,
        );
        b.warn(diag);
        return Ok(None);
    }
    Ok(Some(value as u32))
}

fn parse_u32(property: &str, text: &str, span: Span) -> Result<u32, TableError> {
    text.parse().map_err(|_| invalid_integer(property, text, span))
}

fn invalid_integer(property: &str, text: &str, span: Span) -> TableError {
    TableError::InvalidInteger {
        property: property.to_string(),
        token: text.to_string(),
        span,
    }
}

fn parse_frequency(property: &str, text: &str, span: Span) -> Result<Frequency, TableError> {
    text.parse().map_err(|source| TableError::InvalidFrequency {
        property: property.to_string(),
        source,
        span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpreted_properties_resolve() {
        for name in ["PROTOCOL", "NUM_MI", "RANGE_BASE_ADDR", "XLEN", "CORE_SELECTOR"] {
            assert!(matches!(dispatch(name), Dispatch::Handler(h) if h.name == name));
        }
    }

    #[test]
    fn aliases_share_a_property() {
        let (Dispatch::Handler(a), Dispatch::Handler(b)) =
            (dispatch("BASE_ADDR"), dispatch("RANGE_BASE_ADDR"))
        else {
            panic!("expected handlers");
        };
        assert_eq!(a.property, b.property);
        let Dispatch::Handler(clock) = dispatch("CLOCK_DOMAIN_MAIN") else {
            panic!("expected handler");
        };
        assert_eq!(clock.property, Property::MainClockDomain);
    }

    #[test]
    fn tuning_properties_are_retained() {
        for name in ["ID_WIDTH", "AWUSER_WIDTH", "BUSER_WIDTH", "STRATEGY", "Slave_Priority"] {
            assert!(matches!(dispatch(name), Dispatch::Retained), "{name}");
        }
    }

    #[test]
    fn unknown_property_is_unsupported() {
        assert!(matches!(dispatch("LINKER_SCRIPT"), Dispatch::Unsupported));
        assert!(matches!(dispatch("protocol"), Dispatch::Unsupported));
    }

    #[test]
    fn every_property_has_a_canonical_entry() {
        for h in HANDLERS {
            assert!(
                HANDLERS.iter().any(|c| c.property == h.property && c.name == h.property.as_str()),
                "{}",
                h.name
            );
        }
    }
}
