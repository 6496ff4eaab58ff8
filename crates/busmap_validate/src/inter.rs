//! Parent/child containment across records.

use crate::error::{ValidationError, ValidationWarning};
use crate::validator::CheckMode;
use busmap_common::AddressRange;
use busmap_config::ValidationPolicy;
use busmap_table::{ConfigRecord, RecordSet};

/// One parent port that maps a child bus.
struct Edge<'a> {
    parent: &'a ConfigRecord,
    port: usize,
    window: AddressRange,
    child: &'a ConfigRecord,
}

/// Enumerates every parent port whose range name is another live bus.
///
/// Mock (`DISABLE`) buses take part neither as parent nor as child.
fn edges<'a>(records: &'a RecordSet) -> impl Iterator<Item = Edge<'a>> + 'a {
    records
        .buses()
        .filter(|parent| !parent.is_disabled())
        .flat_map(move |parent| {
            parent
                .ranges()
                .into_iter()
                .enumerate()
                .filter_map(move |(port, window)| {
                    let child = records.get(&window.name)?;
                    let live_bus = child.is_bus() && !child.is_disabled();
                    (live_bus && child.name != parent.name).then_some(Edge {
                        parent,
                        port,
                        window,
                        child,
                    })
                })
        })
}

/// Returns the first and last address occupied by `child`, in declared order.
///
/// The span runs from the first range's base to the last range's end; ranges
/// are not sorted.
fn occupied_span(child: &ConfigRecord) -> Option<(u64, u64)> {
    let ranges = child.ranges();
    let first = ranges.first()?;
    let last = ranges.last()?;
    Some((first.base, last.end))
}

/// Checks that every child bus lies inside the window its parent reserved.
///
/// Assumes every record already passed [`validate_intra`](crate::validate_intra).
/// The result does not depend on the order the records were loaded in; in
/// [`CheckMode::FailFast`] only the first failure in load order is returned.
pub fn validate_inter(
    records: &RecordSet,
    policy: &ValidationPolicy,
    mode: CheckMode,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    for edge in edges(records) {
        let Some((span_base, span_end)) = occupied_span(edge.child) else {
            errors.push(ValidationError::EmptyChildBus {
                parent: edge.parent.name.clone(),
                port: edge.port,
                child: edge.child.name.clone(),
            });
            if mode == CheckMode::FailFast {
                break;
            }
            continue;
        };

        if edge.window.contains_span(span_base, span_end) {
            log::debug!(
                "{} [{span_base:#x}, {span_end:#x}] fits {} port {}",
                edge.child.name,
                edge.parent.name,
                edge.port
            );
            continue;
        }
        if policy.is_loopback(&edge.child.name) {
            log::debug!(
                "{} is a loopback bus, not contained in {} port {}",
                edge.child.name,
                edge.parent.name,
                edge.port
            );
            continue;
        }

        errors.push(ValidationError::NotContained {
            parent: edge.parent.name.clone(),
            port: edge.port,
            child: edge.child.name.clone(),
            window: edge.window,
            span_base,
            span_end,
        });
        if mode == CheckMode::FailFast {
            break;
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Lists child buses whose first range does not start at their parent port's base.
pub fn child_base_advisories(records: &RecordSet) -> Vec<ValidationWarning> {
    edges(records)
        .filter_map(|edge| {
            let child_base = *edge.child.base_addr.first()?;
            (child_base != edge.window.base).then(|| ValidationWarning::ChildBaseMismatch {
                parent: edge.parent.name.clone(),
                port: edge.port,
                child: edge.child.name.clone(),
                port_base: edge.window.base,
                child_base,
            })
        })
        .collect()
}
