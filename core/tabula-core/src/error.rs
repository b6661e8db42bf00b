//! Error types for tabula.
//!
//! All public APIs return `TabulaResult<T>`; library code does not panic.

use crate::transport::TransportError;
use thiserror::Error;

/// Unified error type for all tabula operations.
#[derive(Debug, Error)]
pub enum TabulaError {
    /// Construct the store cannot express (NOT filters, bulk update)
    #[error("operation not supported: {feature}\nHint: {hint}")]
    UnsupportedOperation { feature: String, hint: String },

    /// Remote store failure, propagated verbatim
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// No property definitions registered for a model kind
    #[error("model '{0}' is not registered")]
    ModelNotRegistered(String),

    /// Invalid arguments
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TabulaError {
    pub(crate) fn unsupported(feature: impl Into<String>, hint: impl Into<String>) -> Self {
        TabulaError::UnsupportedOperation {
            feature: feature.into(),
            hint: hint.into(),
        }
    }

    /// Returns true if the remote store reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TabulaError::Transport(e) if e.is_not_found())
    }
}

/// Result type alias for all tabula operations.
pub type TabulaResult<T> = Result<T, TabulaError>;

impl From<serde_json::Error> for TabulaError {
    fn from(err: serde_json::Error) -> Self {
        TabulaError::Serialization(err.to_string())
    }
}
