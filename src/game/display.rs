//! Outbound presentation interface
//!
//! The controller never talks to a UI directly. It reports through
//! this trait after every board change so any frontend, a terminal, a
//! test recorder or nothing at all, can follow the game without the
//! controller knowing who is listening.

use crate::game::moves::Move;
use tracing::{debug, info};

/// Sink for game events the controller wants shown
pub trait GameDisplay: Send + Sync {
    /// The board changed; the flags say whether undo and redo are
    /// currently available
    fn on_update(&self, undo_available: bool, redo_available: bool);

    /// A line of text for the player, such as the game outcome
    fn on_message(&self, text: &str);

    /// A validated move is about to be applied
    fn on_move_shown(&self, mv: &Move);
}

/// Display that swallows every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDisplay;

impl GameDisplay for NullDisplay {
    fn on_update(&self, _undo_available: bool, _redo_available: bool) {}
    fn on_message(&self, _text: &str) {}
    fn on_move_shown(&self, _mv: &Move) {}
}

/// Display that forwards events to the tracing subscriber
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDisplay;

impl GameDisplay for TracingDisplay {
    fn on_update(&self, undo_available: bool, redo_available: bool) {
        debug!(
            "[DISPLAY] Board updated (undo: {}, redo: {})",
            undo_available, redo_available
        );
    }

    fn on_message(&self, text: &str) {
        info!("[DISPLAY] {}", text);
    }

    fn on_move_shown(&self, mv: &Move) {
        debug!(
            "[DISPLAY] Move: piece {:?} over {} hop(s), {} captured",
            mv.piece(),
            mv.hop_count(),
            mv.capture_count()
        );
    }
}
