//! `busmap map`: decoded address windows per bus.

use busmap_common::AddressRange;
use busmap_diagnostics::{DiagnosticSink, Severity, TerminalRenderer};
use busmap_source::SourceDb;
use busmap_table::ConfigRecord;
use serde::Serialize;

use crate::pipeline::{load_policy, read_tables, render_diagnostics};
use crate::{GlobalArgs, MapArgs, ReportFormat};

const SIZE_UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// One bus in the JSON listing.
#[derive(Serialize)]
struct BusMap {
    bus: String,
    protocol: Option<String>,
    ranges: Vec<RangeEntry>,
}

#[derive(Serialize)]
struct RangeEntry {
    name: String,
    base: String,
    end: String,
    width: u32,
    size: String,
}

impl From<&AddressRange> for RangeEntry {
    fn from(range: &AddressRange) -> Self {
        Self {
            name: range.name.clone(),
            base: format!("{:#010x}", range.base),
            end: format!("{:#010x}", range.end),
            width: range.width,
            size: window_size(range.width),
        }
    }
}

/// Formats a `2^width`-byte window size in binary units, e.g. `64 KiB`.
fn window_size(width: u32) -> String {
    if width >= 10 * SIZE_UNITS.len() as u32 {
        return format!("2^{width} B");
    }
    let unit = width / 10;
    let value = 1u128 << (width - unit * 10);
    format!("{value} {}", SIZE_UNITS[unit as usize])
}

fn bus_map(record: &ConfigRecord) -> BusMap {
    BusMap {
        bus: record.name.clone(),
        protocol: record.protocol.as_ref().map(ToString::to_string),
        ranges: record.ranges().iter().map(RangeEntry::from).collect(),
    }
}

/// Runs the `busmap map` command.
///
/// Lists every bus's windows in declared order without validating. Returns 1
/// if any table failed to load.
pub fn run(args: &MapArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let policy = load_policy(global, &args.profile)?;
    let mut db = SourceDb::new();
    let sink = DiagnosticSink::new();
    let records = read_tables(&args.tables, &policy, &mut db, &sink);
    let maps: Vec<BusMap> = records.buses().map(bus_map).collect();

    match args.format {
        ReportFormat::Text => {
            render_diagnostics(&sink.diagnostics(), &db, global.color);
            for map in &maps {
                println!("{}", render_bus(map));
            }
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&maps)?);
        }
    }

    if sink.has_errors() {
        let renderer = TerminalRenderer::new(global.color);
        eprintln!(
            "{} {} table(s) failed to load",
            renderer.tag(Severity::Error),
            sink.error_count()
        );
        Ok(1)
    } else {
        Ok(0)
    }
}

/// Renders one bus as an aligned table.
fn render_bus(map: &BusMap) -> String {
    let protocol = map.protocol.as_deref().unwrap_or("no protocol");
    let mut out = format!("{} ({protocol})\n", map.bus);
    let name_width = map.ranges.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for r in &map.ranges {
        out.push_str(&format!(
            "  {:<name_width$}  {}  {}  {}\n",
            r.name, r.base, r.end, r.size
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use busmap_table::{Protocol, RecordKind};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn window_sizes() {
        assert_eq!(window_size(0), "1 B");
        assert_eq!(window_size(12), "4 KiB");
        assert_eq!(window_size(16), "64 KiB");
        assert_eq!(window_size(30), "1 GiB");
        assert_eq!(window_size(64), "16 EiB");
        assert_eq!(window_size(80), "2^80 B");
    }

    #[test]
    fn renders_ranges_in_declared_order() {
        let mut record = ConfigRecord::new("PBUS", RecordKind::Bus);
        record.protocol = Some(Protocol::Axi4Lite);
        record.range_names = vec!["UART".to_string(), "GPIO".to_string()];
        record.base_addr = vec![0x4000_1000, 0x4000_0000];
        record.range_addr_width = vec![12, 12];
        let text = render_bus(&bus_map(&record));
        assert_eq!(
            text,
            "PBUS (AXI4LITE)\n  \
             UART  0x40001000  0x40001fff  4 KiB\n  \
             GPIO  0x40000000  0x40000fff  4 KiB\n"
        );
    }

    #[test]
    fn entry_pads_addresses() {
        let entry = RangeEntry::from(&AddressRange::new("BRAM", 0, 16));
        assert_eq!(entry.base, "0x00000000");
        assert_eq!(entry.end, "0x0000ffff");
    }

    #[test]
    fn map_lists_loaded_buses() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("busmap.toml");
        fs::write(&config, "").unwrap();
        let table = tmp.path().join("config_peripheral_bus.csv");
        fs::write(
            &table,
            "Property,Value\nRANGE_NAMES,UART\nRANGE_BASE_ADDR,0x0\nRANGE_ADDR_WIDTH,12\n",
        )
        .unwrap();
        let unbound = tmp.path().join("notes.csv");
        fs::write(&unbound, "Property,Value\n").unwrap();
        let global = GlobalArgs {
            quiet: true,
            color: false,
            config: Some(config),
        };
        let mut args = MapArgs {
            tables: vec![table],
            profile: "embedded".to_string(),
            format: ReportFormat::Json,
        };
        assert_eq!(run(&args, &global).unwrap(), 0);
        args.tables.push(unbound);
        assert_eq!(run(&args, &global).unwrap(), 1);
    }
}
