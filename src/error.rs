//! Error types shared by the engine, the solvers and the parsing helpers.
use crate::engine::Status;
use thiserror::Error;

/// Why a command was refused even though its arguments were well formed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvalidCommand {
    /// The session already reached a terminal status; only a new game is accepted.
    #[error("the session is over ({0}); start a new game")]
    SessionOver(Status),
}

/// Errors surfaced at the command boundary.
///
/// A command that returns an error has not touched the session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("index {index} is out of range for a sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid command: {0}")]
    InvalidCommand(#[from] InvalidCommand),
    #[error("unrecognized character '{ch}' at position {position}")]
    UnrecognizedToken { ch: char, position: usize },
    #[error("unknown token \"{0}\" (expected heads or tails)")]
    UnknownToken(String),
    #[error("unknown strategy \"{0}\" (expected a or b)")]
    UnknownStrategy(String),
    #[error("a sequence must hold at least one token")]
    EmptySequence,
    #[error("a game needs a budget of at least one move")]
    ZeroBudget,
}
