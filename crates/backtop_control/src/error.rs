//! Control error types

use std::path::PathBuf;

use backtop_platform::PlatformError;
use thiserror::Error;

/// Settings loading and validation errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Input could not be parsed
    #[error("Failed to parse settings: {0}")]
    Parse(String),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    /// A field holds a value outside its allowed range
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// Settings file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while building or updating the floating control
#[derive(Error, Debug)]
pub enum ControlError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
