//! Clock frequencies with unit parsing and display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const HZ_PER_KHZ: u64 = 1_000;
const HZ_PER_MHZ: u64 = 1_000_000;
const HZ_PER_GHZ: u64 = 1_000_000_000;

/// A clock frequency stored as a whole number of Hertz.
///
/// Property tables express clock domains in MHz, so a bare number parses as
/// MHz ("100" is 100 MHz). Suffixed forms ("322MHz", "50khz", "1GHz",
/// "48000Hz") are accepted case-insensitively. Integer storage gives exact
/// equality, which clock-domain membership checks rely on.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Frequency(u64);

impl Frequency {
    /// Creates a frequency from a value in Hertz.
    pub fn new(hz: u64) -> Self {
        Self(hz)
    }

    /// Creates a frequency from a whole number of megahertz.
    pub fn from_mhz(mhz: u64) -> Self {
        Self(mhz.saturating_mul(HZ_PER_MHZ))
    }

    /// Returns the frequency in Hertz.
    pub fn hz(&self) -> u64 {
        self.0
    }

    /// Returns the frequency in megahertz.
    pub fn mhz(&self) -> f64 {
        self.0 as f64 / HZ_PER_MHZ as f64
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({self})")
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.0 as f64;
        if self.0 >= HZ_PER_GHZ {
            write!(f, "{}GHz", hz / HZ_PER_GHZ as f64)
        } else if self.0 >= HZ_PER_MHZ {
            write!(f, "{}MHz", hz / HZ_PER_MHZ as f64)
        } else if self.0 >= HZ_PER_KHZ {
            write!(f, "{}KHz", hz / HZ_PER_KHZ as f64)
        } else {
            write!(f, "{}Hz", self.0)
        }
    }
}

/// Error type for parsing frequency strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid frequency: '{input}'")]
pub struct ParseFrequencyError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseFrequencyError {
            input: s.to_string(),
        };

        let lower = s.to_ascii_lowercase();
        let (number, scale) = if let Some(num) = lower.strip_suffix("ghz") {
            (num, HZ_PER_GHZ)
        } else if let Some(num) = lower.strip_suffix("mhz") {
            (num, HZ_PER_MHZ)
        } else if let Some(num) = lower.strip_suffix("khz") {
            (num, HZ_PER_KHZ)
        } else if let Some(num) = lower.strip_suffix("hz") {
            (num, 1)
        } else {
            // Bare number: MHz, as written in the clock-domain properties
            (lower.as_str(), HZ_PER_MHZ)
        };

        let number = number.trim();
        if let Ok(whole) = number.parse::<u64>() {
            return whole.checked_mul(scale).map(Frequency).ok_or_else(err);
        }
        let val: f64 = number.parse().map_err(|_| err())?;
        if !val.is_finite() || val < 0.0 {
            return Err(err());
        }
        Ok(Frequency((val * scale as f64).round() as u64))
    }
}
