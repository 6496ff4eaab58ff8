//! Address-map validation for hierarchical AXI interconnects.
//!
//! Validation runs in two phases. [`validate_intra`] checks each record on its
//! own (roles, protocol, counts, widths, alignment, overlap, clocks, unique
//! names). Once every record passes, [`validate_inter`] checks that each child
//! bus fits inside the window its parent reserved for it. The [`Validator`]
//! drives both phases and turns findings into diagnostics.

#![warn(missing_docs)]

pub mod error;
pub mod inter;
pub mod intra;
pub mod report;
pub mod validator;

pub use error::{ValidationError, ValidationWarning};
pub use inter::{child_base_advisories, validate_inter};
pub use intra::validate_intra;
pub use report::{error_diagnostic, warning_diagnostic};
pub use validator::{CheckMode, Validator, Verdict};
