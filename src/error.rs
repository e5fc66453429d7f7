//! Error types for configuration loading and color parsing
//!
//! The simulation itself never fails: degenerate inputs degrade to no-ops.
//! Errors only surface at the edges, when a host loads configuration.

use thiserror::Error;

/// Errors that can occur while loading or validating a [`SimulationConfig`]
///
/// [`SimulationConfig`]: crate::config::SimulationConfig
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file extension is not a supported config format
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine config format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The config parsed but holds values the simulation cannot run with
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from parsing a palette color
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must be 'transparent' or start with '#': {0}")]
    MissingHash(String),

    #[error("expected 3, 6 or 8 hex digits: {0}")]
    BadLength(String),

    #[error("invalid hex digit in color: {0}")]
    BadDigit(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
