//! Result and error types for Sumar.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Sumar operations
pub type SumarResult<T> = Result<T, SumarError>;

/// Errors that can occur while aggregating or reporting coverage
#[derive(Debug, Error)]
pub enum SumarError {
    /// Invalid or contradictory configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error without path context
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific file
    #[error("Unable to access {}: {source}", path.display())]
    File {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Structurally malformed or incompatible recording data
    #[error("Corrupt execution data: {message}")]
    CorruptData {
        /// Error message
        message: String,
    },

    /// Recording file written by an unsupported format version
    #[error("Unsupported execution data format {found:#06x} (expected {expected:#06x})")]
    VersionMismatch {
        /// Version found in the file header
        found: u16,
        /// Version this library understands
        expected: u16,
    },

    /// A compiled artifact the analyzer cannot make sense of
    #[error("Unable to analyze {}: {message}", artifact.display())]
    Analysis {
        /// Offending artifact path
        artifact: PathBuf,
        /// Error message
        message: String,
    },
}

impl SumarError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a file access error
    #[must_use]
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Create a corrupt-data error
    #[must_use]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptData {
            message: message.into(),
        }
    }

    /// Create an analysis error for a specific artifact
    #[must_use]
    pub fn analysis(artifact: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Analysis {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Whether this error is fatal regardless of strict mode
    #[must_use]
    pub fn is_always_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::CorruptData { .. } | Self::VersionMismatch { .. }
        )
    }
}
