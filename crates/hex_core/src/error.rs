//! Error types for the hex simulation core.

use thiserror::Error;

use crate::hex::HexCoord;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation core errors.
///
/// Lookups that simply find nothing return `Option`/empty collections
/// instead of an error; these variants cover the cases a caller has to
/// react to.
#[derive(Debug, Error)]
pub enum GameError {
    /// No tile exists at the requested coordinate.
    #[error("No tile at {0}")]
    TileNotFound(HexCoord),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// A state machine rejected a transition.
    #[error("Illegal transition from {from} to {to}")]
    InvalidTransition {
        /// State the machine was in.
        from: String,
        /// State that was requested.
        to: String,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Encoding or decoding a snapshot failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A snapshot was rejected before it touched any tile.
    #[error("Snapshot rejected: {0}")]
    SnapshotValidation(String),

    /// A tickable or turn listener reported a failure during dispatch.
    #[error("Subscriber failed: {0}")]
    ListenerFailed(String),

    /// Building placement or removal was refused.
    #[error("Building action refused at {coord}: {reason}")]
    BuildingRefused {
        /// Target tile.
        coord: HexCoord,
        /// Why the action was refused.
        reason: String,
    },
}
