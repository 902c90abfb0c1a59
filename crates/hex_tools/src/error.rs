//! Tool error type.

use std::path::PathBuf;

use hex_core::error::GameError;
use thiserror::Error;

/// Result alias for tool operations.
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Errors reported by the development tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The core rejected a file or a simulation step.
    #[error(transparent)]
    Core(#[from] GameError),

    /// A file or directory could not be read.
    #[error("Cannot read '{path}': {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// One or more files in a directory failed validation.
    #[error("{failed} of {checked} data files failed validation")]
    ValidationFailed {
        /// Files checked.
        checked: usize,
        /// Files that failed.
        failed: usize,
    },

    /// Report output could not be encoded.
    #[error("Cannot encode report: {0}")]
    Report(#[from] serde_json::Error),
}
