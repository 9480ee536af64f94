//! Bridge to an external move-computation engine
//!
//! The engine sees the board as five bitmasks and speaks in square
//! indices, a compact numbering of the playable squares only. This
//! module owns that wire format plus the [`MoveEngine`] trait the
//! controller drives, and ships [`RandomEngine`] as the built-in
//! implementation.
//!
//! # Wire format
//!
//! Square `(row, col)` maps to index `row * (size / 2) + col / 2`.
//! Because each row holds `size / 2` playable squares, the index is
//! also the square's position in the row-major playable scan, which is
//! exactly the bit number used by [`BoardMasks`].

pub mod random;

pub use random::RandomEngine;

use crate::error::GameResult;
use crate::game::board::BoardMasks;
use crate::game::piece::Color;
use crate::game::position::Position;
use async_trait::async_trait;

/// One move-computation request
#[derive(Clone, Copy, Debug)]
pub struct EngineRequest {
    /// Side to move
    pub side: Color,
    /// Playing strength, higher is stronger
    pub level: u8,
    /// Current board occupancy
    pub masks: BoardMasks,
    /// Whether the engine should append this position to its own history
    pub add_to_history: bool,
    /// Whether the engine may consult its opening book
    pub use_opening_book: bool,
}

/// Asynchronous move computation
///
/// The history hooks have default no-op implementations so engines
/// without internal state only implement [`compute_move`].
///
/// [`compute_move`]: MoveEngine::compute_move
#[async_trait]
pub trait MoveEngine: Send + Sync {
    /// Compute a move for the requested side
    ///
    /// The returned path holds square indices, the moving piece's
    /// current square first and every landing square after it.
    /// `Ok(None)` means the engine declines to move.
    async fn compute_move(&self, request: EngineRequest) -> GameResult<Option<Vec<u32>>>;

    /// Feed back a move chosen outside the engine
    async fn learn(&self, _side: Color, _path: &[u32], _captured: &[u32]) -> GameResult<()> {
        Ok(())
    }

    /// Rewind the engine's internal history one step
    async fn undo(&self) -> GameResult<()> {
        Ok(())
    }

    /// Replay the engine's internal history one step
    async fn redo(&self) -> GameResult<()> {
        Ok(())
    }

    /// Drop the engine's internal history
    async fn clear_history(&self) -> GameResult<()> {
        Ok(())
    }
}

/// Square index of a playable position
#[inline]
pub fn encode_square(pos: Position, size: u8) -> u32 {
    pos.row as u32 * (size as u32 / 2) + pos.col as u32 / 2
}

/// Position of a square index
#[inline]
pub fn decode_square(index: u32, size: u8) -> Position {
    let half = size as u32 / 2;
    let row = index / half;
    let mut col = (index % half) * 2;
    if (row + col) % 2 == 0 {
        col += 1;
    }
    Position::new(row as u8, col as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::position::playable_positions;

    #[test]
    fn test_square_codec_round_trips() {
        for size in [8u8, 10] {
            for pos in playable_positions(size) {
                let index = encode_square(pos, size);
                assert_eq!(decode_square(index, size), pos);
            }
        }
    }

    #[test]
    fn test_square_index_matches_playable_scan_order() {
        //! The wire index doubles as the mask bit number
        for (ordinal, pos) in playable_positions(8).enumerate() {
            assert_eq!(encode_square(pos, 8), ordinal as u32);
        }
    }

    #[test]
    fn test_known_squares() {
        assert_eq!(encode_square(Position::new(0, 1), 8), 0);
        assert_eq!(encode_square(Position::new(1, 0), 8), 4);
        assert_eq!(encode_square(Position::new(7, 6), 8), 31);
        assert_eq!(decode_square(0, 8), Position::new(0, 1));
        assert_eq!(decode_square(31, 8), Position::new(7, 6));
    }
}
