//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `kairos.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// The target frequency string is not a valid frequency.
    #[error("invalid target frequency: {0}")]
    InvalidFrequency(#[from] kairos_common::ParseFrequencyError),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
