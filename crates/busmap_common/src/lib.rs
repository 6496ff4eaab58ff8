//! Shared foundational types used across the busmap address-map checker.
//!
//! This crate provides clock frequency values, hexadecimal address parsing,
//! and the [`AddressRange`] interval type that every validator reasons about.

#![warn(missing_docs)]

pub mod address;
pub mod frequency;

pub use address::{parse_hex_address, window_mask, AddressRange, ParseAddressError};
pub use frequency::{Frequency, ParseFrequencyError};
