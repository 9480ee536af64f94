//! Board state and piece arena
//!
//! The board owns every piece for the lifetime of one game. Pieces live
//! in a slab indexed by [`PieceId`]; captured pieces leave an empty slot
//! behind so surviving ids never shift. A parallel `size x size` grid
//! maps squares back to ids for O(1) occupancy checks.
//!
//! # Architecture
//!
//! - `grid` - square to piece id, row-major, light squares always empty
//! - `pieces` - id to piece data, slots emptied on capture
//! - `white` / `black` - per-side rosters for one-color iteration
//!
//! Snapshots flatten the board to occupancy by color and rank, without
//! ids, so two boards reached by different move orders compare equal
//! when the same material sits on the same squares.

use crate::error::{GameError, GameResult};
use crate::game::moves::Move;
use crate::game::piece::{Color, Piece, PieceId, Rank};
use crate::game::player::PlayerSide;
use crate::game::position::{playable_positions, Position};
use serde::{Deserialize, Serialize};

/// Bit-per-square occupancy masks for the engine wire format
///
/// Bit `i` corresponds to the `i`-th playable square in row-major
/// order. Only boards whose playable-square count fits in 64 bits can
/// be encoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoardMasks {
    pub black_men: u64,
    pub black_kings: u64,
    pub white_men: u64,
    pub white_kings: u64,
    pub occupied: u64,
}

/// Identity-free picture of the board
///
/// Cells are scanned row-major over all squares, playable or not, so a
/// snapshot restores onto a fresh board without knowing which squares
/// are dark.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: u8,
    pub cells: Vec<Option<(Color, Rank)>>,
}

/// A checkers board with its pieces
#[derive(Clone, Debug)]
pub struct Board {
    size: u8,
    grid: Vec<Option<PieceId>>,
    pieces: Vec<Option<Piece>>,
    white: PlayerSide,
    black: PlayerSide,
}

impl Board {
    /// Create an empty board
    ///
    /// The size must be even and at least 4 so both sides get playable
    /// rows and the mirror symmetry of the starting layout holds.
    pub fn empty(size: u8) -> GameResult<Self> {
        if size < 4 || size % 2 != 0 {
            return Err(GameError::Config {
                message: format!("board size must be even and at least 4, got {size}"),
            });
        }
        Ok(Self {
            size,
            grid: vec![None; size as usize * size as usize],
            pieces: Vec::new(),
            white: PlayerSide::new(Color::White),
            black: PlayerSide::new(Color::Black),
        })
    }

    /// Create a board with both sides' starting rows filled
    ///
    /// White men occupy the playable squares of the bottom `rows` rows,
    /// black men mirror them from the top. The two camps must leave at
    /// least two empty rows between them.
    pub fn with_starting_rows(size: u8, rows: u8) -> GameResult<Self> {
        let mut board = Self::empty(size)?;
        if rows as u16 * 2 + 2 > size as u16 {
            return Err(GameError::Config {
                message: format!("{rows} starting rows leave no room to move on a {size}x{size} board"),
            });
        }
        for pos in playable_positions(size) {
            if pos.row < rows {
                board.place_piece(Color::White, Rank::Man, pos);
            } else if pos.row >= size - rows {
                board.place_piece(Color::Black, Rank::Man, pos);
            }
        }
        Ok(board)
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    #[inline]
    fn grid_index(&self, pos: Position) -> usize {
        pos.row as usize * self.size as usize + pos.col as usize
    }

    pub fn piece_id_at(&self, pos: Position) -> Option<PieceId> {
        if !pos.in_bounds(self.size) {
            return None;
        }
        self.grid[self.grid_index(pos)]
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        self.piece_id_at(pos).and_then(|id| self.piece(id))
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0 as usize).and_then(|slot| slot.as_ref())
    }

    fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id.0 as usize).and_then(|slot| slot.as_mut())
    }

    pub fn side(&self, color: Color) -> &PlayerSide {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    fn side_mut(&mut self, color: Color) -> &mut PlayerSide {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Put a new piece on an empty playable square
    pub fn place_piece(&mut self, side: Color, rank: Rank, pos: Position) -> PieceId {
        debug_assert!(pos.in_bounds(self.size));
        debug_assert!(pos.is_playable());
        debug_assert!(self.piece_id_at(pos).is_none());
        let id = PieceId(self.pieces.len() as u32);
        self.pieces.push(Some(Piece {
            id,
            side,
            rank,
            pos,
        }));
        let index = self.grid_index(pos);
        self.grid[index] = Some(id);
        self.side_mut(side).add_piece(id);
        id
    }

    /// Take a piece off the board, leaving its slot empty
    pub fn remove_piece(&mut self, id: PieceId) {
        let Some(piece) = self.pieces.get_mut(id.0 as usize).and_then(|slot| slot.take()) else {
            return;
        };
        let index = self.grid_index(piece.pos);
        self.grid[index] = None;
        self.side_mut(piece.side).remove_piece(id);
    }

    /// Apply a validated move: remove its captures, relocate the piece
    /// and promote a man reaching the terminal row
    ///
    /// Returns false without touching the board when the move has no
    /// hops or its piece is gone.
    pub fn apply_move(&mut self, mv: &Move) -> bool {
        let Some(target) = mv.last_hop() else {
            return false;
        };
        if self.piece(mv.piece()).is_none() {
            return false;
        }
        for &captured in mv.captured() {
            self.remove_piece(captured);
        }
        self.relocate(mv.piece(), target);
        let size = self.size;
        if let Some(piece) = self.piece_mut(mv.piece()) {
            if piece.rank == Rank::Man && piece.pos.row == piece.side.terminal_row(size) {
                piece.rank = Rank::King;
            }
        }
        true
    }

    /// Move a piece to an empty square without promotion
    pub(crate) fn relocate(&mut self, id: PieceId, target: Position) {
        debug_assert!(target.in_bounds(self.size));
        debug_assert!(self.piece_id_at(target).is_none());
        let Some(piece) = self.piece_mut(id) else {
            return;
        };
        let from = piece.pos;
        piece.pos = target;
        let from_index = self.grid_index(from);
        let to_index = self.grid_index(target);
        self.grid[from_index] = None;
        self.grid[to_index] = Some(id);
    }

    /// Encode the board into the engine's bitmask wire format
    pub fn encode(&self) -> GameResult<BoardMasks> {
        let squares = self.size as u32 * self.size as u32 / 2;
        if squares > 64 {
            return Err(GameError::UnsupportedBoard { size: self.size });
        }
        let mut masks = BoardMasks::default();
        for (bit, pos) in playable_positions(self.size).enumerate() {
            let Some(piece) = self.piece_at(pos) else {
                continue;
            };
            let flag = 1u64 << bit;
            masks.occupied |= flag;
            match (piece.side, piece.rank) {
                (Color::Black, Rank::Man) => masks.black_men |= flag,
                (Color::Black, Rank::King) => masks.black_kings |= flag,
                (Color::White, Rank::Man) => masks.white_men |= flag,
                (Color::White, Rank::King) => masks.white_kings |= flag,
            }
        }
        Ok(masks)
    }

    /// Flatten the board into an identity-free snapshot
    pub fn snapshot(&self) -> BoardSnapshot {
        let cells = self
            .grid
            .iter()
            .map(|slot| {
                slot.and_then(|id| self.piece(id)).map(|p| (p.side, p.rank))
            })
            .collect();
        BoardSnapshot {
            size: self.size,
            cells,
        }
    }

    /// Replace the whole board state with a snapshot's
    ///
    /// Piece ids are reassigned from zero; callers holding old ids must
    /// drop them.
    pub fn restore(&mut self, snapshot: &BoardSnapshot) {
        self.size = snapshot.size;
        self.grid = vec![None; self.size as usize * self.size as usize];
        self.pieces.clear();
        self.white = PlayerSide::new(Color::White);
        self.black = PlayerSide::new(Color::Black);
        for (index, cell) in snapshot.cells.iter().enumerate() {
            if let Some((side, rank)) = cell {
                let row = (index / self.size as usize) as u8;
                let col = (index % self.size as usize) as u8;
                self.place_piece(*side, *rank, Position::new(row, col));
            }
        }
    }

    /// Compare material and squares, ignoring piece identity
    pub fn positional_eq(&self, other: &Board) -> bool {
        self.snapshot() == other.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::Move;

    #[test]
    fn test_empty_board_rejects_bad_sizes() {
        assert!(Board::empty(8).is_ok());
        assert!(Board::empty(4).is_ok());
        assert!(Board::empty(7).is_err());
        assert!(Board::empty(2).is_err());
    }

    #[test]
    fn test_starting_rows_standard_board() {
        //! The classic 8x8 layout seats twelve men per side
        let board = Board::with_starting_rows(8, 3).unwrap();
        assert_eq!(board.side(Color::White).piece_count(), 12);
        assert_eq!(board.side(Color::Black).piece_count(), 12);

        let white = board.piece_at(Position::new(0, 1)).unwrap();
        assert_eq!(white.side, Color::White);
        assert_eq!(white.rank, Rank::Man);

        let black = board.piece_at(Position::new(7, 6)).unwrap();
        assert_eq!(black.side, Color::Black);

        assert!(board.piece_at(Position::new(3, 2)).is_none());
        assert!(board.piece_at(Position::new(4, 5)).is_none());
    }

    #[test]
    fn test_starting_rows_need_space_between_camps() {
        assert!(Board::with_starting_rows(8, 3).is_ok());
        assert!(Board::with_starting_rows(8, 4).is_err());
        assert!(Board::with_starting_rows(10, 4).is_ok());
        assert!(Board::with_starting_rows(4, 1).is_ok());
    }

    #[test]
    fn test_apply_simple_move_relocates() {
        let mut board = Board::empty(8).unwrap();
        let id = board.place_piece(Color::White, Rank::Man, Position::new(2, 3));
        let mut mv = Move::new(id);
        mv.push_hop(Position::new(3, 4));
        assert!(board.apply_move(&mv));
        assert!(board.piece_at(Position::new(2, 3)).is_none());
        assert_eq!(board.piece(id).unwrap().pos, Position::new(3, 4));
    }

    #[test]
    fn test_apply_capture_removes_victim_everywhere() {
        let mut board = Board::empty(8).unwrap();
        let white = board.place_piece(Color::White, Rank::Man, Position::new(2, 3));
        let black = board.place_piece(Color::Black, Rank::Man, Position::new(3, 4));
        let mut mv = Move::new(white);
        mv.push_hop(Position::new(4, 5));
        mv.record_capture(black);
        assert!(board.apply_move(&mv));
        assert!(board.piece(black).is_none());
        assert!(board.piece_at(Position::new(3, 4)).is_none());
        assert_eq!(board.side(Color::Black).piece_count(), 0);
        assert_eq!(board.piece(white).unwrap().pos, Position::new(4, 5));
    }

    #[test]
    fn test_man_promotes_on_terminal_row() {
        let mut board = Board::empty(8).unwrap();
        let id = board.place_piece(Color::White, Rank::Man, Position::new(6, 3));
        let mut mv = Move::new(id);
        mv.push_hop(Position::new(7, 4));
        assert!(board.apply_move(&mv));
        assert_eq!(board.piece(id).unwrap().rank, Rank::King);
    }

    #[test]
    fn test_king_keeps_rank_leaving_terminal_row() {
        let mut board = Board::empty(8).unwrap();
        let id = board.place_piece(Color::White, Rank::King, Position::new(7, 4));
        let mut mv = Move::new(id);
        mv.push_hop(Position::new(6, 3));
        assert!(board.apply_move(&mv));
        assert_eq!(board.piece(id).unwrap().rank, Rank::King);
    }

    #[test]
    fn test_apply_move_rejects_empty_or_stale() {
        let mut board = Board::empty(8).unwrap();
        let id = board.place_piece(Color::White, Rank::Man, Position::new(2, 3));
        assert!(!board.apply_move(&Move::new(id)));
        board.remove_piece(id);
        let mut mv = Move::new(id);
        mv.push_hop(Position::new(3, 4));
        assert!(!board.apply_move(&mv));
    }

    #[test]
    fn test_encode_sets_expected_bits() {
        let mut board = Board::empty(8).unwrap();
        board.place_piece(Color::White, Rank::Man, Position::new(0, 1));
        board.place_piece(Color::Black, Rank::King, Position::new(7, 6));
        let masks = board.encode().unwrap();
        assert_eq!(masks.white_men, 1 << 0);
        assert_eq!(masks.black_kings, 1 << 31);
        assert_eq!(masks.occupied, (1 << 0) | (1 << 31));
        assert_eq!(masks.white_kings, 0);
        assert_eq!(masks.black_men, 0);
    }

    #[test]
    fn test_encode_rejects_oversized_board() {
        let board = Board::empty(12).unwrap();
        assert!(matches!(
            board.encode(),
            Err(GameError::UnsupportedBoard { size: 12 })
        ));
    }

    #[test]
    fn test_snapshot_ignores_identity() {
        //! Two boards with the same material on the same squares are
        //! positionally equal even when the pieces arrived differently
        let mut a = Board::empty(8).unwrap();
        a.place_piece(Color::White, Rank::Man, Position::new(2, 3));
        a.place_piece(Color::Black, Rank::Man, Position::new(5, 4));

        let mut b = Board::empty(8).unwrap();
        b.place_piece(Color::Black, Rank::Man, Position::new(5, 4));
        b.place_piece(Color::White, Rank::Man, Position::new(2, 3));

        assert!(a.positional_eq(&b));
        assert_eq!(a.snapshot(), b.snapshot());

        b.place_piece(Color::White, Rank::King, Position::new(0, 1));
        assert!(!a.positional_eq(&b));
    }

    #[test]
    fn test_restore_round_trips() {
        let mut board = Board::with_starting_rows(8, 3).unwrap();
        let snapshot = board.snapshot();

        let id = board.piece_id_at(Position::new(2, 3)).unwrap();
        let mut mv = Move::new(id);
        mv.push_hop(Position::new(3, 4));
        board.apply_move(&mv);
        assert_ne!(board.snapshot(), snapshot);

        board.restore(&snapshot);
        assert_eq!(board.snapshot(), snapshot);
        assert_eq!(board.side(Color::White).piece_count(), 12);
        assert_eq!(board.side(Color::Black).piece_count(), 12);
        assert!(board.piece_at(Position::new(2, 3)).is_some());
    }
}
