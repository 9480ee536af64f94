//! Board coordinates
//!
//! Positions are 0-indexed `(row, col)` pairs. Only dark squares, where
//! `row + col` is odd, are playable; the light squares stay empty for
//! the whole game and are never addressed by game logic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A square on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Check if this square can ever hold a piece
    #[inline]
    pub fn is_playable(&self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    /// Check if this square lies on a `size x size` board
    #[inline]
    pub fn in_bounds(&self, size: u8) -> bool {
        self.row < size && self.col < size
    }

    /// The square halfway between this square and `other`
    ///
    /// Only meaningful for capture hops, where both coordinate deltas
    /// are exactly two.
    #[inline]
    pub fn midpoint(&self, other: Position) -> Position {
        Position::new((self.row + other.row) / 2, (self.col + other.col) / 2)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// All playable squares of a `size x size` board in row-major order
///
/// The iteration order here fixes the bit layout of the mask encoding
/// and the square indices of the engine wire format, so it must never
/// change.
pub fn playable_positions(size: u8) -> impl Iterator<Item = Position> {
    (0..size)
        .flat_map(move |row| (0..size).map(move |col| Position::new(row, col)))
        .filter(|pos| pos.is_playable())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playable_squares_are_dark() {
        assert!(!Position::new(0, 0).is_playable());
        assert!(Position::new(0, 1).is_playable());
        assert!(Position::new(1, 0).is_playable());
        assert!(!Position::new(1, 1).is_playable());
        assert!(Position::new(7, 6).is_playable());
    }

    #[test]
    fn test_in_bounds() {
        assert!(Position::new(0, 0).in_bounds(8));
        assert!(Position::new(7, 7).in_bounds(8));
        assert!(!Position::new(8, 0).in_bounds(8));
        assert!(!Position::new(0, 8).in_bounds(8));
    }

    #[test]
    fn test_midpoint_of_capture_hop() {
        let from = Position::new(2, 3);
        let to = Position::new(4, 5);
        assert_eq!(from.midpoint(to), Position::new(3, 4));

        let back = Position::new(4, 1);
        assert_eq!(Position::new(2, 3).midpoint(back), Position::new(3, 2));
    }

    #[test]
    fn test_playable_positions_count_and_order() {
        //! An 8x8 board has 32 playable squares, scanned row-major
        let squares: Vec<Position> = playable_positions(8).collect();
        assert_eq!(squares.len(), 32);
        assert_eq!(squares[0], Position::new(0, 1));
        assert_eq!(squares[3], Position::new(0, 7));
        assert_eq!(squares[4], Position::new(1, 0));
        assert_eq!(squares[31], Position::new(7, 6));
        assert!(squares.iter().all(|p| p.is_playable()));
    }
}
