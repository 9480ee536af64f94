//! Game logic: board, rules and the turn controller
//!
//! # Architecture
//!
//! The data model builds up in layers. `position` and `piece` define
//! the geometry, `moves` the hop paths, `board` the owning state,
//! `rules` the legality walk over it. On top sit `history` for
//! undo/redo and repetition counting, `state` for the game lifecycle,
//! and `controller` for the async control cycle fed by `sources` and
//! reporting through `display`.

pub mod board;
pub mod controller;
pub mod display;
pub mod history;
pub mod moves;
pub mod piece;
pub mod player;
pub mod position;
pub mod rules;
pub mod sources;
pub mod state;

pub use board::{Board, BoardMasks, BoardSnapshot};
pub use controller::{ControlTask, ControllerHandle, GameController, GameSetup, PendingTask};
pub use display::{GameDisplay, NullDisplay, TracingDisplay};
pub use history::GameHistory;
pub use moves::Move;
pub use piece::{Color, Piece, PieceId, Rank};
pub use player::PlayerSide;
pub use position::{playable_positions, Position};
pub use sources::{EngineSource, InteractiveSource, MoveFeeder, MoveSource, SeatKind};
pub use state::{GamePhase, PhaseState};
