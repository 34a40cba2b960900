//! Error types for the skirmish simulation.

use thiserror::Error;

use crate::components::{UnitId, UnitKind};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
///
/// None of these abort a match: a failed operation leaves the game state
/// untouched and the tick carries on.
#[derive(Debug, Error)]
pub enum GameError {
    /// A purchase or investment was denied.
    #[error("Insufficient funds: need {required} coins, have {available}")]
    InsufficientFunds {
        /// Coins required.
        required: u32,
        /// Coins available.
        available: u32,
    },

    /// No live enemy unit exists to target.
    #[error("No enemy found")]
    NoEnemyFound,

    /// A unit id does not resolve to a roster entry.
    #[error("Target not found: unit {0}")]
    TargetNotFound(UnitId),

    /// The unit kind has no stat table.
    #[error("Unknown unit type: {0:?}")]
    UnknownUnitType(UnitKind),

    /// Operation not valid for the current game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Match configuration could not be parsed.
    #[error("Failed to parse match config '{source_name}': {message}")]
    ConfigParse {
        /// File path or other origin of the config text.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Match configuration file could not be read.
    #[error("Failed to read match config: {0}")]
    ConfigIo(#[from] std::io::Error),
}
