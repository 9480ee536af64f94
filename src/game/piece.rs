//! Piece identity, color and rank
//!
//! Pieces live in an arena owned by the board and are addressed through
//! [`PieceId`] handles. Rank is a tagged variant so movement and
//! legality logic can match exhaustively; a man promotes by mutating its
//! rank in place, never by swapping identities.

use crate::game::position::Position;
use serde::{Deserialize, Serialize};

/// Which side a piece belongs to
///
/// White sits on the low rows and advances toward higher row numbers;
/// black mirrors it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row direction this side advances in
    #[inline]
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// The promotion row on a board of `size` rows
    #[inline]
    pub fn terminal_row(&self, size: u8) -> u8 {
        match self {
            Color::White => size - 1,
            Color::Black => 0,
        }
    }
}

/// Rank of a piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    /// Moves and captures forward only
    Man,
    /// Moves and captures in all four diagonal directions
    King,
}

/// Stable handle to a piece in the board arena
///
/// Handles stay valid for the lifetime of one board; a captured piece's
/// slot is emptied, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

/// A live piece
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub side: Color,
    pub rank: Rank,
    pub pos: Position,
}

impl Piece {
    /// Geometrically possible target squares, ignoring occupancy
    ///
    /// A man considers the two diagonal squares one step toward its
    /// forward direction and the two diagonal squares two steps toward
    /// it; a king considers all four diagonal directions at one and two
    /// steps. `capture_only` restricts the result to the two-step set.
    /// Targets outside the board are dropped; legality is the caller's
    /// problem.
    pub fn possible_targets(&self, board_size: u8, capture_only: bool) -> Vec<Position> {
        let mut targets = Vec::new();
        let row = self.pos.row as i16;
        let col = self.pos.col as i16;
        let forward = self.side.forward() as i16;
        let row_dirs: &[i16] = match self.rank {
            Rank::Man => &[1],
            Rank::King => &[1, -1],
        };
        for &dir in row_dirs {
            for step in [1i16, 2] {
                if capture_only && step == 1 {
                    continue;
                }
                let r = row + dir * forward * step;
                if r < 0 || r >= board_size as i16 {
                    continue;
                }
                for dc in [-step, step] {
                    let c = col + dc;
                    if c < 0 || c >= board_size as i16 {
                        continue;
                    }
                    targets.push(Position::new(r as u8, c as u8));
                }
            }
        }
        targets
    }
}
