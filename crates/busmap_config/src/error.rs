//! Error types for policy loading and profile resolution.

/// Errors that can occur when loading or validating a `busmap.toml` policy.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the policy file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// The requested clock profile does not exist in the policy.
    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A policy value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
