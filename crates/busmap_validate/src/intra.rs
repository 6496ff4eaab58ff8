//! Per-record checks.
//!
//! Checks run in a fixed order: role, protocol, counts, widths, alignment,
//! overlap, clocks, unique names. Roles, protocol and counts are structural:
//! any failure there ends the record's validation in every mode, because the
//! later checks index the parallel sequences those steps vouch for.

use crate::error::ValidationError;
use crate::validator::CheckMode;
use busmap_common::AddressRange;
use busmap_config::ValidationPolicy;
use busmap_table::{ConfigRecord, Property, Protocol, RecordKind};
use std::collections::HashMap;

/// Marker returned by a check when validation of the record must stop.
struct Stop;

/// Accumulates findings according to the check mode.
struct Findings {
    mode: CheckMode,
    errors: Vec<ValidationError>,
}

impl Findings {
    /// Records an error. Fail-fast mode stops at the first one.
    fn push(&mut self, err: ValidationError) -> Result<(), Stop> {
        self.errors.push(err);
        match self.mode {
            CheckMode::FailFast => Err(Stop),
            CheckMode::CollectAll => Ok(()),
        }
    }

    /// Stops if anything has been recorded so far.
    fn checkpoint(&self) -> Result<(), Stop> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Stop)
        }
    }
}

/// Checks one record for self-consistency.
///
/// Returns every error found: exactly one in [`CheckMode::FailFast`], all
/// range-level errors in [`CheckMode::CollectAll`].
pub fn validate_intra(
    record: &ConfigRecord,
    policy: &ValidationPolicy,
    mode: CheckMode,
) -> Result<(), Vec<ValidationError>> {
    let mut findings = Findings {
        mode,
        errors: Vec::new(),
    };
    // A `Stop` only ends the walk; the findings carry the result.
    let _ = run_checks(record, policy, &mut findings);
    if findings.errors.is_empty() {
        Ok(())
    } else {
        Err(findings.errors)
    }
}

fn run_checks(
    record: &ConfigRecord,
    policy: &ValidationPolicy,
    out: &mut Findings,
) -> Result<(), Stop> {
    check_role(record, policy, out)?;
    out.checkpoint()?;
    if record.kind == RecordKind::System {
        return Ok(());
    }

    check_protocol(record, out)?;
    out.checkpoint()?;
    check_counts(record, policy, out)?;
    out.checkpoint()?;

    if record.is_disabled() {
        log::debug!("{}: DISABLE, skipping range checks", record.name);
        return Ok(());
    }

    let ranges = record.ranges();
    check_widths(record, &ranges, out)?;
    check_alignment(record, &ranges, out)?;
    check_overlap(record, &ranges, out)?;
    if policy.carries_clock_map(&record.name) {
        check_clocks(record, policy, out)?;
    }
    check_unique_prefixes(record, policy, out)
}

/// Step 1: only the system table selects a core, and it must be supported.
fn check_role(
    record: &ConfigRecord,
    policy: &ValidationPolicy,
    out: &mut Findings,
) -> Result<(), Stop> {
    match (record.kind, &record.core_selector) {
        (RecordKind::System, None) => out.push(ValidationError::MissingCore {
            record: record.name.clone(),
        }),
        (RecordKind::System, Some(core)) if !policy.supports_core(core) => {
            out.push(ValidationError::UnsupportedCore {
                record: record.name.clone(),
                core: core.clone(),
            })
        }
        (RecordKind::Bus, Some(core)) => out.push(ValidationError::CoreOnBus {
            record: record.name.clone(),
            core: core.clone(),
        }),
        _ => Ok(()),
    }
}

/// Step 2: AXI4, AXI4LITE or DISABLE.
fn check_protocol(record: &ConfigRecord, out: &mut Findings) -> Result<(), Stop> {
    match &record.protocol {
        Some(Protocol::Axi4 | Protocol::Axi4Lite | Protocol::Disable) => Ok(()),
        Some(Protocol::Other(p)) => out.push(ValidationError::UnsupportedProtocol {
            record: record.name.clone(),
            protocol: Some(p.clone()),
        }),
        None => out.push(ValidationError::UnsupportedProtocol {
            record: record.name.clone(),
            protocol: None,
        }),
    }
}

/// Step 3: every parallel sequence matches its declared count.
fn check_counts(
    record: &ConfigRecord,
    policy: &ValidationPolicy,
    out: &mut Findings,
) -> Result<(), Stop> {
    let mut sequences = vec![
        (Property::RangeNames, record.range_names.len(), Property::NumMi),
        (Property::BaseAddr, record.base_addr.len(), Property::NumMi),
        (Property::RangeAddrWidth, record.range_addr_width.len(), Property::NumMi),
    ];
    if policy.carries_clock_map(&record.name) {
        sequences.push((
            Property::RangeClockDomains,
            record.range_clock_domains.len(),
            Property::NumMi,
        ));
    }
    sequences.push((Property::MasterNames, record.master_names.len(), Property::NumSi));

    for (field, found, count_field) in sequences {
        let expected = match count_field {
            Property::NumSi => record.num_si,
            _ => record.num_mi,
        };
        if found != expected as usize {
            out.push(ValidationError::CountMismatch {
                record: record.name.clone(),
                field,
                count_field,
                expected,
                found,
            })?;
        }
    }
    Ok(())
}

/// Step 4: bus width is sane and every range fits between the protocol minimum
/// and the bus width.
fn check_widths(
    record: &ConfigRecord,
    ranges: &[AddressRange],
    out: &mut Findings,
) -> Result<(), Stop> {
    if !(1..=64).contains(&record.addr_width) {
        out.push(ValidationError::BusWidthOutOfRange {
            record: record.name.clone(),
            addr_width: record.addr_width,
        })?;
    }
    let protocol = record.protocol.as_ref();
    let minimum = protocol.and_then(Protocol::min_range_width);
    for (index, range) in ranges.iter().enumerate() {
        if range.width > record.addr_width {
            out.push(ValidationError::RangeWiderThanBus {
                record: record.name.clone(),
                index,
                range: range.name.clone(),
                width: range.width,
                addr_width: record.addr_width,
            })?;
        }
        if let (Some(minimum), Some(protocol)) = (minimum, protocol) {
            if range.width < minimum {
                out.push(ValidationError::BelowProtocolMinimum {
                    record: record.name.clone(),
                    index,
                    range: range.name.clone(),
                    width: range.width,
                    protocol: protocol.to_string(),
                    minimum,
                })?;
            }
        }
    }
    Ok(())
}

/// Step 5: every base is a multiple of its window size.
fn check_alignment(
    record: &ConfigRecord,
    ranges: &[AddressRange],
    out: &mut Findings,
) -> Result<(), Stop> {
    for (index, range) in ranges.iter().enumerate() {
        if !range.is_aligned() {
            out.push(ValidationError::Misaligned {
                record: record.name.clone(),
                index,
                range: range.name.clone(),
                base: range.base,
                width: range.width,
            })?;
        }
    }
    Ok(())
}

/// Step 6: each range is compared with every earlier accepted range.
///
/// Touching windows count as overlapping. A range that overlaps is not
/// accepted, so one bad range is reported once rather than against every
/// later neighbour.
fn check_overlap(
    record: &ConfigRecord,
    ranges: &[AddressRange],
    out: &mut Findings,
) -> Result<(), Stop> {
    let mut accepted: Vec<(usize, &AddressRange)> = Vec::with_capacity(ranges.len());
    for (index, range) in ranges.iter().enumerate() {
        match accepted.iter().find(|(_, prev)| range.overlaps(prev)) {
            Some(&(other_index, other)) => out.push(ValidationError::Overlap {
                record: record.name.clone(),
                index,
                range: range.clone(),
                other_index,
                other: other.clone(),
            })?,
            None => accepted.push((index, range)),
        }
    }
    Ok(())
}

/// Step 7: main and per-range clocks against the profile and the clock classes.
fn check_clocks(
    record: &ConfigRecord,
    policy: &ValidationPolicy,
    out: &mut Findings,
) -> Result<(), Stop> {
    let main = record.clock_domain_main;
    let supported = || policy.frequencies.iter().copied().collect::<Vec<_>>();

    if !policy.supports_frequency(main) {
        out.push(ValidationError::MainClockUnsupported {
            record: record.name.clone(),
            clock: main,
            profile: policy.profile.clone(),
            supported: supported(),
        })?;
    }

    for (index, (range, &clock)) in record
        .range_names
        .iter()
        .zip(&record.range_clock_domains)
        .enumerate()
    {
        if let Some((prefix, allowed)) = policy.exemption_for(range) {
            if !allowed.contains(&clock) {
                out.push(ValidationError::ExemptClockMismatch {
                    record: record.name.clone(),
                    index,
                    range: range.clone(),
                    prefix: prefix.to_string(),
                    clock,
                    allowed: allowed.iter().copied().collect(),
                })?;
            }
        } else if policy.in_main_domain(range) {
            if clock != main {
                out.push(ValidationError::MainDomainMismatch {
                    record: record.name.clone(),
                    index,
                    range: range.clone(),
                    clock,
                    main,
                })?;
            }
        } else if !policy.supports_frequency(clock) {
            out.push(ValidationError::RangeClockUnsupported {
                record: record.name.clone(),
                index,
                range: range.clone(),
                clock,
                profile: policy.profile.clone(),
                supported: supported(),
            })?;
        }
    }
    Ok(())
}

/// Step 8: at most one range per reserved prefix.
fn check_unique_prefixes(
    record: &ConfigRecord,
    policy: &ValidationPolicy,
    out: &mut Findings,
) -> Result<(), Stop> {
    let mut first_seen: HashMap<&str, (usize, &str)> = HashMap::new();
    for (index, name) in record.range_names.iter().enumerate() {
        let Some(prefix) = policy.unique_prefix_of(name) else {
            continue;
        };
        match first_seen.get(prefix) {
            Some(&(first_index, first)) => out.push(ValidationError::DuplicateUniquePrefix {
                record: record.name.clone(),
                prefix: prefix.to_string(),
                index,
                range: name.clone(),
                first_index,
                first: first.to_string(),
            })?,
            None => {
                first_seen.insert(prefix, (index, name.as_str()));
            }
        }
    }
    Ok(())
}
