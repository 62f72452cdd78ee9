//! Error types for Pulse

use thiserror::Error;

/// The main error type for Pulse operations
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Unknown scene: {name} is not one of {allowed:?}")]
    UnknownScene { name: String, allowed: Vec<String> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

impl PulseError {
    /// Shorthand for a configuration fault
    pub fn config(msg: impl Into<String>) -> Self {
        PulseError::Config(msg.into())
    }
}

/// Result type alias for Pulse operations
pub type Result<T> = std::result::Result<T, PulseError>;

impl From<toml::de::Error> for PulseError {
    fn from(err: toml::de::Error) -> Self {
        PulseError::TomlParseError(err.to_string())
    }
}
