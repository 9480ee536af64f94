//! Game phase tracking
//!
//! The phase moves strictly forward: a game is idle until started,
//! running until it ends, and ends exactly once in one of the terminal
//! phases. Invalid transitions are logged and dropped in release
//! builds and panic under debug assertions so tests catch them.

use crate::game::piece::Color;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Lifecycle phase of one game
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Created but not yet running
    #[default]
    Idle,
    /// Turns are being played
    Running,
    /// Ended by threefold repetition
    Draw,
    /// White captured or blocked every black piece
    WhiteWon,
    /// Black captured or blocked every white piece
    BlackWon,
    /// Ended early by a stop request, an illegal move or an engine failure
    Stopped,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GamePhase::Draw | GamePhase::WhiteWon | GamePhase::BlackWon | GamePhase::Stopped
        )
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            GamePhase::WhiteWon => Some(Color::White),
            GamePhase::BlackWon => Some(Color::Black),
            _ => None,
        }
    }

    /// Human-readable outcome line
    pub fn message(&self) -> &'static str {
        match self {
            GamePhase::Idle => "game not started",
            GamePhase::Running => "game in progress",
            GamePhase::Draw => "draw by threefold repetition",
            GamePhase::WhiteWon => "white wins",
            GamePhase::BlackWon => "black wins",
            GamePhase::Stopped => "game stopped",
        }
    }
}

/// Current phase with transition validation
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseState {
    phase: GamePhase,
}

impl PhaseState {
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Move to the next phase, enforcing the forward-only lifecycle
    pub fn transition_to(&mut self, next: GamePhase) {
        let valid = matches!(
            (self.phase, next),
            (GamePhase::Idle, GamePhase::Running)
        ) || (self.phase == GamePhase::Running && next.is_terminal());

        if !valid {
            error!(
                "[GAME] Invalid phase transition: {:?} -> {:?}",
                self.phase, next
            );
            #[cfg(debug_assertions)]
            panic!(
                "invalid phase transition: {:?} -> {:?}",
                self.phase, next
            );
            #[cfg(not(debug_assertions))]
            return;
        }
        self.phase = next;
    }
}
