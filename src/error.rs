//! Error types for the checkers engine
//!
//! Provides the crate-wide error taxonomy covering move validation,
//! external engine failures, persistence, and configuration loading.
//! None of these conditions are fatal to the process: illegal moves and
//! engine failures end the current game, load failures leave the
//! in-memory game untouched, and configuration errors fall back to
//! defaults.

/// Errors that can occur in game logic and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Move failed a legality check
    #[error("Illegal move: {message}")]
    IllegalMove { message: String },

    /// The external move-computation engine declined or failed
    #[error("Engine failure: {message}")]
    EngineFailure { message: String },

    /// Persisted game state could not be decoded
    #[error("Corrupt save data: {message}")]
    CorruptSave { message: String },

    /// Configuration value was malformed or unreadable
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Board too large for the 64-bit mask encoding
    #[error("Board size {size} exceeds bitmask capacity")]
    UnsupportedBoard { size: u8 },

    /// Underlying I/O failure
    #[error("I/O error: {message}")]
    Io { message: String },
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
