//! `busmap check`: table loading and address-map validation.
//!
//! 1. Load the policy and resolve the clock profile
//! 2. Read every property table into a record
//! 3. Validate each record, then parent/child containment
//! 4. Render diagnostics and the final verdict

use busmap_diagnostics::{Diagnostic, DiagnosticSink, Severity, TerminalRenderer};
use busmap_source::SourceDb;
use busmap_validate::{CheckMode, Validator};
use serde::Serialize;

use crate::pipeline::{load_policy, read_tables, render_diagnostics, status};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// The JSON report printed with `--format json`.
#[derive(Serialize)]
struct CheckReport<'a> {
    passed: bool,
    records: usize,
    diagnostics: &'a [Diagnostic],
}

/// Runs the `busmap check` command.
///
/// Returns exit code 0 if every check passed, 1 on any load or validation error.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let policy = load_policy(global, &args.profile)?;
    let renderer = TerminalRenderer::new(global.color);
    let info = renderer.tag(Severity::Info);
    let text = args.format == ReportFormat::Text;

    if text {
        status(
            global,
            format!(
                "{info} Checking {} table(s) with profile '{}'",
                args.tables.len(),
                policy.profile
            ),
        );
    }

    let mut db = SourceDb::new();
    let sink = DiagnosticSink::new();
    let records = read_tables(&args.tables, &policy, &mut db, &sink);

    let passed = if sink.has_errors() {
        log::debug!("load errors, skipping validation");
        false
    } else {
        let mode = if args.all {
            CheckMode::CollectAll
        } else {
            CheckMode::FailFast
        };
        let progress = |name: &str| {
            if text {
                status(global, format!("{info} Checking {name}..."));
            }
        };
        let verdict = Validator::new(&policy, mode)
            .with_progress(&progress)
            .run(&records, &sink);
        verdict.passed && !sink.has_errors()
    };

    let errors = sink.error_count();
    let warnings = sink.warning_count();
    let diagnostics = sink.take_all();

    match args.format {
        ReportFormat::Text => {
            render_diagnostics(&diagnostics, &db, global.color);
            if passed {
                status(global, format!("{info} Configuration check passed"));
            } else {
                eprintln!(
                    "{} Configuration check failed: {errors} error(s), {warnings} warning(s)",
                    renderer.tag(Severity::Error)
                );
            }
        }
        ReportFormat::Json => {
            let report = CheckReport {
                passed,
                records: records.len(),
                diagnostics: &diagnostics,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(if passed { 0 } else { 1 })
}
