//! Error taxonomy for the engine.

use serde::Serialize;
use thiserror::Error;

/// Why a player action was refused. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidMove {
    #[error("cells are not adjacent")]
    NotAdjacent,
    #[error("swap does not produce a match")]
    NoMatch,
    #[error("cell holds no special token")]
    NoSpecial,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cell index {index} is outside the grid")]
    OutOfRange { index: usize },
    #[error("a move is still resolving")]
    Busy,
    #[error("no move is resolving")]
    NotResolving,
    #[error("invalid move: {0}")]
    InvalidMove(#[from] InvalidMove),
    #[error("invalid board: {0}")]
    InvalidBoard(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least {min} colors are required, got {got}")]
    TooFewColors { got: u8, min: u8 },
    #[error("at most {max} colors are supported, got {got}")]
    TooManyColors { got: u8, max: u8 },
    #[error("maxGenerationAttempts must be positive")]
    ZeroGenerationAttempts,
}
