//! Parsing and validation of `busmap.toml` policy files.
//!
//! This crate reads the policy file (or falls back to the built-in defaults) and
//! resolves a named clock profile into the [`ValidationPolicy`] consumed by the
//! table loader and the validators.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{builtin_config, load_config, load_config_from_str};
pub use resolve::{resolve_profile, BusPolicy, TableBinding, ValidationPolicy};
pub use types::*;
