//! Checkers rule engine and turn controller
//!
//! Implements the full ruleset of two-player checkers on boards of
//! arbitrary even size: directional movement, mandatory and maximal
//! capture chains, king promotion, undo/redo over a replayable history
//! and threefold-repetition draw detection.
//!
//! # Module Organization
//!
//! - `game` - Board, pieces, move legality and the async turn controller
//! - `engine` - Bridge to an external move-computation engine
//! - `persist` - Results tally and saved-game wire format
//! - `config` - Game configuration with silent-default fallback
//! - `error` - Crate-wide error taxonomy
//!
//! # Concurrency
//!
//! One background task owns the board and history and drives the control
//! cycle. External callers communicate through a single-slot move channel
//! per interactive seat, a single-slot pending task flag, and a
//! generation token for cancellation. See [`game::GameController`].

pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod persist;
