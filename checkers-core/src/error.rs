//! Error types for the engine.
//!
//! None of these are fatal: a failed automated turn is a [`Forfeit`], and
//! the game continues with the manual side.

use serde::Serialize;

/// Reply text did not contain a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no move found in reply")]
    NoMoveFound,
}

/// Failure reaching the oracle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// Request never produced a response
    #[error("oracle unreachable: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("oracle returned status {0}")]
    Status(u16),

    /// Response body was not in the expected shape
    #[error("could not decode oracle response: {0}")]
    Decode(String),

    /// No conversation could be created for this session
    #[error("conversation bootstrap failed: {0}")]
    Bootstrap(String),
}

/// Why the automated side lost its turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum Forfeit {
    #[error("oracle failed: {0}")]
    Oracle(String),

    #[error("reply contained no move")]
    NoMoveFound,

    #[error("move {0} is off the board")]
    OffBoard(String),

    #[error("no piece on {0}")]
    EmptySource(String),

    #[error("move {0} is not legal")]
    IllegalMove(String),
}

impl From<OracleError> for Forfeit {
    fn from(err: OracleError) -> Self {
        Forfeit::Oracle(err.to_string())
    }
}

impl From<ParseError> for Forfeit {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::NoMoveFound => Forfeit::NoMoveFound,
        }
    }
}
