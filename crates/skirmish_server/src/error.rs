//! Error types for the match host.

use skirmish_core::error::GameError;
use skirmish_core::protocol::MatchId;
use thiserror::Error;

/// Result type for host operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors raised outside the simulation core.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The match host has stopped reading its inbox.
    #[error("match {0} is no longer accepting messages")]
    InboxClosed(MatchId),

    /// No match with this id is registered.
    #[error("unknown match: {0}")]
    UnknownMatch(MatchId),

    /// Loading the match config failed.
    #[error("config error: {0}")]
    Config(#[from] GameError),

    /// Encoding the match report failed.
    #[error("report encoding failed: {0}")]
    Report(#[from] serde_json::Error),
}
