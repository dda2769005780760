//! Centralized error types for the game core.
//!
//! Gameplay never fails through these types: a blocked move, a missing path or
//! an action taken in the wrong state is reported as a plain `false` or an empty
//! result. Errors only surface while building a level or loading tuning.

use glam::IVec2;

/// Main error type for the game core.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),
}

/// Error type for board parsing operations.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown character {character:?} in board at ({x}, {y})")]
    UnknownCharacter { character: char, x: usize, y: usize },

    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("Board has no rows")]
    EmptyBoard,

    #[error("Board has no player start marker")]
    MissingPlayerStart,
}

/// Errors related to level construction.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MapError {
    #[error("Unknown level: {0}")]
    UnknownLevel(u8),

    #[error("Spawn position {0} is out of bounds")]
    SpawnOutOfBounds(IVec2),

    #[error("Spawn position {0} is on a blocking cell")]
    SpawnOnBlockedCell(IVec2),
}

/// Errors raised while loading or validating tuning.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to extract tuning: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("Invalid tuning: {0}")]
    Invalid(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
