//! Shared pipeline helpers for CLI commands.
//!
//! Contains the steps `check` and `map` have in common: locating and loading
//! the policy file, reading the property tables, and rendering diagnostics.

use std::path::{Path, PathBuf};

use busmap_config::{builtin_config, load_config, resolve_profile, BusmapConfig, ValidationPolicy};
use busmap_diagnostics::{Diagnostic, DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use busmap_source::SourceDb;
use busmap_table::{load_tables, RecordSet};

use crate::GlobalArgs;

/// File name of the policy file searched for when `--config` is not given.
pub const CONFIG_FILE: &str = "busmap.toml";

/// Walks up from `start` looking for the nearest `busmap.toml`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

/// Loads the policy: `--config` if given, else the nearest `busmap.toml`,
/// else the built-in defaults.
pub fn load_policy_file(global: &GlobalArgs) -> Result<BusmapConfig, Box<dyn std::error::Error>> {
    if let Some(ref path) = global.config {
        return Ok(load_config(path)?);
    }
    match find_config(&std::env::current_dir()?) {
        Some(path) => {
            log::debug!("using policy {}", path.display());
            Ok(load_config(&path)?)
        }
        None => {
            log::debug!("no {CONFIG_FILE} found, using built-in policy");
            Ok(builtin_config())
        }
    }
}

/// Loads the policy file and resolves `profile` against it.
pub fn load_policy(
    global: &GlobalArgs,
    profile: &str,
) -> Result<ValidationPolicy, Box<dyn std::error::Error>> {
    let config = load_policy_file(global)?;
    Ok(resolve_profile(&config, profile)?)
}

/// Reads every table into a record set. Load problems go to `sink`.
pub fn read_tables(
    tables: &[PathBuf],
    policy: &ValidationPolicy,
    db: &mut SourceDb,
    sink: &DiagnosticSink,
) -> RecordSet {
    let records = load_tables(tables, policy, db, sink);
    log::debug!("{} of {} table(s) loaded", records.len(), tables.len());
    records
}

/// Renders diagnostics to stderr in load order.
pub fn render_diagnostics(diagnostics: &[Diagnostic], db: &SourceDb, color: bool) {
    let renderer = TerminalRenderer::new(color);
    for diag in diagnostics {
        eprint!("{}", renderer.render(diag, db));
    }
}

/// Prints a status line on stderr unless `--quiet` is set.
pub fn status(global: &GlobalArgs, line: impl std::fmt::Display) {
    if !global.quiet {
        eprintln!("{line}");
    }
}
