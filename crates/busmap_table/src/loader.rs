//! Loading property tables into records.

use crate::builder::RecordBuilder;
use crate::csv::read_rows;
use crate::error::TableError;
use crate::record::{ConfigRecord, RecordKind};
use crate::set::RecordSet;
use busmap_config::{TableBinding, ValidationPolicy};
use busmap_diagnostics::{Diagnostic, DiagnosticSink};
use busmap_source::{FileId, SourceDb};
use std::path::{Path, PathBuf};

/// A record read from one table, with the warnings raised while reading it.
#[derive(Debug)]
pub struct LoadedTable {
    /// The completed record.
    pub record: ConfigRecord,
    /// Unsupported, duplicate and clamped properties.
    pub warnings: Vec<Diagnostic>,
}

/// Reads the table at `path`. The record identity comes from the file name binding.
pub fn load_table(
    path: &Path,
    policy: &ValidationPolicy,
    db: &mut SourceDb,
) -> Result<LoadedTable, TableError> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let binding = bind(file_name, policy)?;
    let file = db.load_file(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = db
        .get_file(file)
        .map(|f| f.content.clone())
        .unwrap_or_default();
    build(binding, file, &content)
}

/// Reads a table held in memory. `file_name` selects the binding and names the source.
pub fn load_table_from_str(
    file_name: &str,
    content: &str,
    policy: &ValidationPolicy,
    db: &mut SourceDb,
) -> Result<LoadedTable, TableError> {
    let binding = bind(file_name, policy)?;
    let file = db.add_source(file_name, content.to_string());
    build(binding, file, content)
}

/// Loads every table, emitting load errors and warnings into `sink`.
///
/// Tables that fail to load are left out of the returned set; callers check
/// [`DiagnosticSink::has_errors`] before validating.
pub fn load_tables(
    paths: &[PathBuf],
    policy: &ValidationPolicy,
    db: &mut SourceDb,
    sink: &DiagnosticSink,
) -> RecordSet {
    let mut set = RecordSet::new();
    for path in paths {
        match load_table(path, policy, db) {
            Ok(loaded) => {
                log::debug!(
                    "loaded {} table {} from {}",
                    loaded.record.kind,
                    loaded.record.name,
                    path.display()
                );
                for warning in loaded.warnings {
                    sink.emit(warning);
                }
                if let Err(err) = set.insert(loaded.record) {
                    sink.emit(err.to_diagnostic());
                }
            }
            Err(err) => sink.emit(err.to_diagnostic()),
        }
    }
    set
}

fn bind(file_name: &str, policy: &ValidationPolicy) -> Result<TableBinding, TableError> {
    policy
        .binding_for(file_name)
        .ok_or_else(|| TableError::UnboundTable {
            file_name: file_name.to_string(),
        })
}

fn build(binding: TableBinding, file: FileId, content: &str) -> Result<LoadedTable, TableError> {
    let (origin, rows) = read_rows(file, content)?;
    let kind = if binding.system {
        RecordKind::System
    } else {
        RecordKind::Bus
    };
    let mut builder = RecordBuilder::new(binding.name, kind, origin);
    for row in &rows {
        builder.apply(row)?;
    }
    let (record, warnings) = builder.finish();
    Ok(LoadedTable { record, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use busmap_config::{builtin_config, resolve_profile};

    fn policy() -> ValidationPolicy {
        resolve_profile(&builtin_config(), "embedded").unwrap()
    }

    #[test]
    fn binding_names_the_record() {
        let mut db = SourceDb::new();
        let loaded = load_table_from_str(
            "config_peripheral_bus.csv",
            "Property,Value\nPROTOCOL,AXI4LITE\n",
            &policy(),
            &mut db,
        )
        .unwrap();
        assert_eq!(loaded.record.name, "PBUS");
        assert_eq!(loaded.record.kind, RecordKind::Bus);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn system_table_kind() {
        let mut db = SourceDb::new();
        let loaded = load_table_from_str(
            "config_system.csv",
            "Property,Value\nCORE_SELECTOR,CORE_CV64A6\nXLEN,64\n",
            &policy(),
            &mut db,
        )
        .unwrap();
        assert_eq!(loaded.record.name, "SYS");
        assert_eq!(loaded.record.kind, RecordKind::System);
        assert_eq!(loaded.record.core_selector.as_deref(), Some("CORE_CV64A6"));
    }

    #[test]
    fn unbound_file_name_errors() {
        let mut db = SourceDb::new();
        let err = load_table_from_str("config_dma.csv", "Property,Value\n", &policy(), &mut db)
            .unwrap_err();
        assert!(matches!(err, TableError::UnboundTable { .. }));
        assert!(db.is_empty());
    }

    #[test]
    fn load_from_disk_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config_main_bus.csv");
        std::fs::write(&path, "Property,Value\nNUM_MI,0\n").unwrap();
        let mut db = SourceDb::new();
        let loaded = load_table(&path, &policy(), &mut db).unwrap();
        assert_eq!(loaded.record.name, "MBUS");
        let origin = db.resolve_span(loaded.record.origin).unwrap();
        assert_eq!(origin.line, 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut db = SourceDb::new();
        let err = load_table(Path::new("/nonexistent/config_main_bus.csv"), &policy(), &mut db)
            .unwrap_err();
        assert_eq!(err.code().to_string(), "T608");
    }

    #[test]
    fn load_tables_collects_errors_and_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("config_main_bus.csv");
        std::fs::write(&good, "Property,Value\nPROTOCOL,AXI4\nFOO,1\n").unwrap();
        let bad = dir.path().join("config_peripheral_bus.csv");
        std::fs::write(&bad, "NUM_MI,1\n").unwrap();
        let unbound = dir.path().join("notes.csv");
        std::fs::write(&unbound, "Property,Value\n").unwrap();

        let sink = DiagnosticSink::new();
        let mut db = SourceDb::new();
        let set = load_tables(&[good, bad, unbound], &policy(), &mut db, &sink);

        assert_eq!(set.len(), 1);
        assert!(set.contains("MBUS"));
        assert_eq!(sink.error_count(), 2);
        assert_eq!(sink.warning_count(), 1);
        let codes: Vec<_> = sink.diagnostics().iter().map(|d| d.code.to_string()).collect();
        assert_eq!(codes, vec!["W402", "T601", "T607"]);
    }

    #[test]
    fn same_table_twice_is_duplicate_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config_main_bus.csv");
        std::fs::write(&path, "Property,Value\n").unwrap();
        let sink = DiagnosticSink::new();
        let mut db = SourceDb::new();
        let set = load_tables(&[path.clone(), path], &policy(), &mut db, &sink);
        assert_eq!(set.len(), 1);
        assert_eq!(sink.diagnostics()[0].code.to_string(), "T609");
    }
}
