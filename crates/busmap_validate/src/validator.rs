//! The two-phase validation run.

use crate::error::ValidationWarning;
use crate::inter::{child_base_advisories, validate_inter};
use crate::intra::validate_intra;
use crate::report::{error_diagnostic, warning_diagnostic};
use busmap_config::ValidationPolicy;
use busmap_diagnostics::DiagnosticSink;
use busmap_table::RecordSet;
use serde::{Deserialize, Serialize};

/// How many errors a run reports before it stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckMode {
    /// Stop at the first failing check of the first failing record.
    #[default]
    FailFast,
    /// Report every range-level error of every record.
    CollectAll,
}

/// The outcome of a validation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// `true` if no record and no parent/child pair failed.
    pub passed: bool,
    /// Records whose own checks ran.
    pub checked: usize,
    /// Records that failed, in load order. Parent/child failures name the child.
    pub failed_records: Vec<String>,
    /// `true` if the parent/child pass ran.
    pub inter_checked: bool,
}

/// Runs per-record checks over a record set, then parent/child containment.
pub struct Validator<'a> {
    policy: &'a ValidationPolicy,
    mode: CheckMode,
    progress: Option<&'a dyn Fn(&str)>,
}

impl<'a> Validator<'a> {
    /// Creates a validator for one profile.
    pub fn new(policy: &'a ValidationPolicy, mode: CheckMode) -> Self {
        Self {
            policy,
            mode,
            progress: None,
        }
    }

    /// Calls `progress` with each record name before its checks run.
    pub fn with_progress(mut self, progress: &'a dyn Fn(&str)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Validates `records`, emitting every finding into `sink`.
    ///
    /// The parent/child pass runs only when every record passed its own checks.
    /// Running twice on the same set yields the same verdict and diagnostics.
    pub fn run(&self, records: &RecordSet, sink: &DiagnosticSink) -> Verdict {
        let mut verdict = Verdict::default();

        for record in records {
            log::debug!("checking {} {}", record.kind, record.name);
            if let Some(progress) = self.progress {
                progress(&record.name);
            }
            verdict.checked += 1;
            match validate_intra(record, self.policy, self.mode) {
                Ok(()) => {
                    if record.is_disabled() {
                        let info = ValidationWarning::DisabledBus {
                            record: record.name.clone(),
                        };
                        sink.emit(warning_diagnostic(&info, records));
                    }
                }
                Err(errors) => {
                    log::debug!("{}: {} error(s)", record.name, errors.len());
                    for err in &errors {
                        sink.emit(error_diagnostic(err, records));
                    }
                    verdict.failed_records.push(record.name.clone());
                    if self.mode == CheckMode::FailFast {
                        break;
                    }
                }
            }
        }

        if !verdict.failed_records.is_empty() {
            log::debug!("skipping parent/child checks after record failures");
            return verdict;
        }

        verdict.inter_checked = true;
        match validate_inter(records, self.policy, self.mode) {
            Ok(()) => {
                for warning in child_base_advisories(records) {
                    sink.emit(warning_diagnostic(&warning, records));
                }
                verdict.passed = true;
            }
            Err(errors) => {
                for err in &errors {
                    sink.emit(error_diagnostic(err, records));
                    let child = err.record().to_string();
                    if !verdict.failed_records.contains(&child) {
                        verdict.failed_records.push(child);
                    }
                }
            }
        }
        verdict
    }
}
