//! Per-side piece roster
//!
//! Each side keeps the ids of its live pieces so turn logic can iterate
//! one color without scanning the whole board. The roster is maintained
//! by the board's place and remove operations.

use crate::game::piece::{Color, PieceId};

/// One side of the game and its live pieces
#[derive(Clone, Debug)]
pub struct PlayerSide {
    color: Color,
    pieces: Vec<PieceId>,
}

impl PlayerSide {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            pieces: Vec::new(),
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn pieces(&self) -> &[PieceId] {
        &self.pieces
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub(crate) fn add_piece(&mut self, id: PieceId) {
        self.pieces.push(id);
    }

    pub(crate) fn remove_piece(&mut self, id: PieceId) {
        self.pieces.retain(|&p| p != id);
    }
}
