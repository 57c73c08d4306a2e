//! Platform error types

use thiserror::Error;

/// Host-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    /// The element is no longer attached to the document
    #[error("Element detached: {0}")]
    Detached(String),

    /// The host refused a style declaration
    #[error("Style rejected: {property}: {value}")]
    StyleRejected { property: String, value: String },

    /// A document operation threw
    #[error("DOM operation failed: {0}")]
    Dom(String),

    /// A host facility (window, document, body) is not available
    #[error("Host facility unavailable: {0}")]
    Unavailable(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
