//! Byte-address windows and hexadecimal address parsing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of hex digits in a 64-bit address literal.
const MAX_HEX_DIGITS: usize = 16;

/// Returns the offset mask of a window `2^width` bytes wide (`2^width - 1`).
///
/// Widths of 64 and above saturate to the full 64-bit address space.
pub fn window_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// A contiguous byte-address window `[base, end]` reserved for one downstream port.
///
/// `end` is inclusive: a window of width 12 based at `0x1000` ends at `0x1fff`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRange {
    /// Name of the device or bus occupying the window.
    pub name: String,
    /// First byte address of the window.
    pub base: u64,
    /// log2 of the window size in bytes.
    pub width: u32,
    /// Last byte address of the window (inclusive).
    pub end: u64,
}

impl AddressRange {
    /// Creates the window `[base, base + 2^width - 1]`.
    ///
    /// The end saturates at `u64::MAX`; an aligned window never needs to.
    pub fn new(name: impl Into<String>, base: u64, width: u32) -> Self {
        Self {
            name: name.into(),
            base,
            width,
            end: base.saturating_add(window_mask(width)),
        }
    }

    /// Returns `true` if `base` is a multiple of the window size.
    pub fn is_aligned(&self) -> bool {
        self.base & window_mask(self.width) == 0
    }

    /// Returns `true` if the two windows share at least one address.
    ///
    /// Both ends are inclusive, so windows that touch at a single address
    /// overlap; neighbours must be separated by at least one address
    /// (`b.base == a.end + 1`). The relation is symmetric.
    pub fn overlaps(&self, other: &AddressRange) -> bool {
        let base_inside = |r: &AddressRange, addr: u64| addr >= r.base && addr <= r.end;
        base_inside(other, self.base)
            || base_inside(other, self.end)
            || base_inside(self, other.base)
            || base_inside(self, other.end)
    }

    /// Returns `true` if `[base, end]` lies entirely within this window.
    pub fn contains_span(&self, base: u64, end: u64) -> bool {
        base >= self.base && end <= self.end
    }

    /// Returns the window size in bytes (`2^width`), which may exceed `u64`.
    pub fn size(&self) -> u128 {
        u128::from(window_mask(self.width)) + 1
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:#x}, {:#x}]", self.name, self.base, self.end)
    }
}

/// Error returned when an address literal is not `0x` followed by 1-16 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address '{input}': expected 0x followed by 1 to 16 hex digits")]
pub struct ParseAddressError {
    /// The rejected literal.
    pub input: String,
}

/// Parses a 64-bit hexadecimal address literal such as `0x40000000`.
///
/// The prefix may be `0x` or `0X`; digits may be upper or lower case.
pub fn parse_hex_address(s: &str) -> Result<u64, ParseAddressError> {
    let err = || ParseAddressError {
        input: s.to_string(),
    };
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(err)?;
    if digits.is_empty()
        || digits.len() > MAX_HEX_DIGITS
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(err());
    }
    u64::from_str_radix(digits, 16).map_err(|_| err())
}
