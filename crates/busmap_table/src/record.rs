//! The configuration record built from one property table.

use busmap_common::{AddressRange, Frequency};
use busmap_source::Span;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Whether a record describes the system or an interconnect.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum RecordKind {
    /// Selects the processor core and global parameters.
    System,
    /// Describes one crossbar.
    Bus,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::System => write!(f, "system"),
            RecordKind::Bus => write!(f, "bus"),
        }
    }
}

/// The AXI flavour a bus speaks.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Protocol {
    /// Full AXI4; windows are at least 4 KiB.
    Axi4,
    /// AXI4-Lite; windows are at least 2 bytes.
    Axi4Lite,
    /// A mock bus exempt from width, overlap and clock checks.
    Disable,
    /// Any other value, kept verbatim and rejected by the validator.
    Other(String),
}

impl Protocol {
    /// Classifies a `PROTOCOL` cell value.
    pub fn parse(value: &str) -> Self {
        match value {
            "AXI4" => Protocol::Axi4,
            "AXI4LITE" => Protocol::Axi4Lite,
            "DISABLE" => Protocol::Disable,
            other => Protocol::Other(other.to_string()),
        }
    }

    /// Returns the smallest range width the protocol allows, or `None` when unchecked.
    pub fn min_range_width(&self) -> Option<u32> {
        match self {
            Protocol::Axi4 => Some(12),
            Protocol::Axi4Lite => Some(1),
            Protocol::Disable | Protocol::Other(_) => None,
        }
    }

    /// Returns `true` for the mock protocol.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Protocol::Disable)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Axi4 => write!(f, "AXI4"),
            Protocol::Axi4Lite => write!(f, "AXI4LITE"),
            Protocol::Disable => write!(f, "DISABLE"),
            Protocol::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Register width of the selected core.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Xlen {
    /// RV32 / 32-bit MicroBlaze-V.
    X32,
    /// RV64 / 64-bit MicroBlaze-V.
    X64,
}

impl Xlen {
    /// Returns the width in bits.
    pub fn bits(self) -> u32 {
        match self {
            Xlen::X32 => 32,
            Xlen::X64 => 64,
        }
    }
}

/// The properties the engine interprets. Aliases resolve to the same variant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Property {
    /// `PROTOCOL`
    Protocol,
    /// `ADDR_WIDTH`
    AddrWidth,
    /// `DATA_WIDTH`
    DataWidth,
    /// `NUM_MI`
    NumMi,
    /// `NUM_SI`
    NumSi,
    /// `MASTER_NAMES`
    MasterNames,
    /// `RANGE_NAMES`
    RangeNames,
    /// `RANGE_BASE_ADDR` (alias `BASE_ADDR`)
    BaseAddr,
    /// `RANGE_ADDR_WIDTH`
    RangeAddrWidth,
    /// `MAIN_CLOCK_DOMAIN` (alias `CLOCK_DOMAIN_MAIN`)
    MainClockDomain,
    /// `RANGE_CLOCK_DOMAINS`
    RangeClockDomains,
    /// `CORE_SELECTOR`
    CoreSelector,
    /// `XLEN`
    Xlen,
}

impl Property {
    /// Returns the canonical property name as written in tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Property::Protocol => "PROTOCOL",
            Property::AddrWidth => "ADDR_WIDTH",
            Property::DataWidth => "DATA_WIDTH",
            Property::NumMi => "NUM_MI",
            Property::NumSi => "NUM_SI",
            Property::MasterNames => "MASTER_NAMES",
            Property::RangeNames => "RANGE_NAMES",
            Property::BaseAddr => "RANGE_BASE_ADDR",
            Property::RangeAddrWidth => "RANGE_ADDR_WIDTH",
            Property::MainClockDomain => "MAIN_CLOCK_DOMAIN",
            Property::RangeClockDomains => "RANGE_CLOCK_DOMAINS",
            Property::CoreSelector => "CORE_SELECTOR",
            Property::Xlen => "XLEN",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a property was declared in its table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpans {
    /// The whole `NAME,VALUE` row.
    pub row: Span,
    /// The value cell.
    pub value: Span,
    /// Each whitespace-separated token of the value cell.
    pub tokens: Vec<Span>,
}

/// A fully-populated, immutable description of one bus or of the system.
///
/// Index `i` of `range_names`, `base_addr`, `range_addr_width` and
/// `range_clock_domains` always refers to the same downstream port.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Unique record name ("MBUS", "PBUS", "SYS", ...).
    pub name: String,
    /// System or bus.
    pub kind: RecordKind,
    /// The bus protocol, `None` when the table does not declare one.
    pub protocol: Option<Protocol>,
    /// Address signal width of the bus.
    pub addr_width: u32,
    /// Data signal width of the bus.
    pub data_width: u32,
    /// Number of downstream (master-interface) ports.
    pub num_mi: u32,
    /// Number of upstream (slave-interface) ports.
    pub num_si: u32,
    /// Initiators connected to the upstream ports.
    pub master_names: Vec<String>,
    /// Device or sub-bus occupying each downstream port.
    pub range_names: Vec<String>,
    /// Base address of each downstream window.
    pub base_addr: Vec<u64>,
    /// log2 size of each downstream window.
    pub range_addr_width: Vec<u32>,
    /// Clock of the core and of the bus itself.
    pub clock_domain_main: Frequency,
    /// Clock of each downstream port.
    pub range_clock_domains: Vec<Frequency>,
    /// The selected core, system tables only.
    pub core_selector: Option<String>,
    /// Core register width.
    pub xlen: Xlen,
    /// Crossbar tuning properties kept verbatim.
    pub extra: BTreeMap<String, String>,
    /// Span of the table header, or dummy for records built in memory.
    pub origin: Span,
    spans: BTreeMap<Property, PropertySpans>,
}

impl ConfigRecord {
    /// Creates a record with the table defaults and no ports.
    pub fn new(name: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            name: name.into(),
            kind,
            protocol: None,
            addr_width: 32,
            data_width: 32,
            num_mi: 0,
            num_si: 0,
            master_names: Vec::new(),
            range_names: Vec::new(),
            base_addr: Vec::new(),
            range_addr_width: Vec::new(),
            clock_domain_main: Frequency::from_mhz(100),
            range_clock_domains: Vec::new(),
            core_selector: None,
            xlen: Xlen::X32,
            extra: BTreeMap::new(),
            origin: Span::DUMMY,
            spans: BTreeMap::new(),
        }
    }

    /// Returns `true` for bus records.
    pub fn is_bus(&self) -> bool {
        self.kind == RecordKind::Bus
    }

    /// Returns `true` if the bus is a mock (`PROTOCOL,DISABLE`).
    pub fn is_disabled(&self) -> bool {
        self.protocol.as_ref().is_some_and(Protocol::is_disabled)
    }

    /// Returns the decoded downstream windows in declared order.
    ///
    /// Pairs beyond the shortest of the three parallel sequences are dropped.
    pub fn ranges(&self) -> Vec<AddressRange> {
        self.range_names
            .iter()
            .zip(&self.base_addr)
            .zip(&self.range_addr_width)
            .map(|((name, &base), &width)| AddressRange::new(name.clone(), base, width))
            .collect()
    }

    /// Returns the window of downstream port `i`, if all three sequences reach it.
    pub fn range(&self, i: usize) -> Option<AddressRange> {
        let name = self.range_names.get(i)?;
        let base = *self.base_addr.get(i)?;
        let width = *self.range_addr_width.get(i)?;
        Some(AddressRange::new(name.clone(), base, width))
    }

    /// Returns `true` if the table declared `prop`.
    pub fn declares(&self, prop: Property) -> bool {
        self.spans.contains_key(&prop)
    }

    /// Records where `prop` was declared.
    pub fn set_spans(&mut self, prop: Property, spans: PropertySpans) {
        self.spans.insert(prop, spans);
    }

    /// Returns the declaration spans of `prop`.
    pub fn spans(&self, prop: Property) -> Option<&PropertySpans> {
        self.spans.get(&prop)
    }

    /// Returns the span of the value cell of `prop`, or the record origin.
    pub fn span_of(&self, prop: Property) -> Span {
        self.spans.get(&prop).map_or(self.origin, |s| s.value)
    }

    /// Returns the span of token `i` of `prop`, falling back to its value cell.
    pub fn token_span(&self, prop: Property, i: usize) -> Span {
        match self.spans.get(&prop) {
            Some(s) => s.tokens.get(i).copied().unwrap_or(s.value),
            None => self.origin,
        }
    }
}
